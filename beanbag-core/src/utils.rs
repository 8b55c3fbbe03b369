//! Utility functions for the container
//!
//! Bean naming helpers and dependency graph analysis.

/// Naming convention utilities for bean names
pub mod naming {
    /// Converts a PascalCase type name to camelCase for bean naming.
    ///
    /// This is the default bean naming strategy: `UserService` becomes `userService`.
    ///
    /// # Examples
    ///
    /// ```
    /// use beanbag_core::utils::naming::to_camel_case;
    ///
    /// assert_eq!(to_camel_case("UserService"), "userService");
    /// assert_eq!(to_camel_case("A"), "a");
    /// assert_eq!(to_camel_case(""), "");
    /// ```
    pub fn to_camel_case(s: &str) -> String {
        let mut chars = s.chars();
        match chars.next() {
            None => String::new(),
            Some(first) => {
                let mut result = String::with_capacity(s.len());
                result.extend(first.to_lowercase());
                result.push_str(chars.as_str());
                result
            }
        }
    }

    /// Strips the module path and generic arguments from a full type name.
    ///
    /// ```
    /// use beanbag_core::utils::naming::short_type_name;
    ///
    /// assert_eq!(short_type_name("app::service::OrderService"), "OrderService");
    /// assert_eq!(short_type_name("app::Repo<app::User>"), "Repo");
    /// ```
    pub fn short_type_name(full: &str) -> &str {
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Default bean name for a type: camelCase of its short name.
    pub fn default_bean_name<T: ?Sized>() -> String {
        to_camel_case(short_type_name(std::any::type_name::<T>()))
    }
}

/// Dependency resolution utilities
pub mod dependency {
    use std::collections::{HashMap, HashSet};

    /// The chain of beans currently being created on one thread.
    ///
    /// The factory keeps one chain per thread, so nested lookups made from a
    /// factory function (through a provider, say) extend the same chain, while
    /// lookups on other threads never see each other's in-flight creations.
    #[derive(Debug, Default)]
    pub struct CreationChain {
        names: Vec<String>,
    }

    impl CreationChain {
        /// Creates a new empty creation chain.
        pub fn new() -> Self {
            Self { names: Vec::new() }
        }

        /// Marks a bean as being created.
        ///
        /// # Errors
        ///
        /// Returns the rendered cycle (`a -> b -> a`) if the bean is already
        /// part of the chain.
        pub fn enter(&mut self, name: &str) -> Result<(), String> {
            if self.contains(name) {
                let mut cycle = self.names.clone();
                cycle.push(name.to_string());
                return Err(cycle.join(" -> "));
            }
            self.names.push(name.to_string());
            Ok(())
        }

        /// Marks a bean as finished being created.
        pub fn exit(&mut self, name: &str) {
            if let Some(pos) = self.names.iter().rposition(|n| n == name) {
                self.names.remove(pos);
            }
        }

        /// Checks if a bean is currently being created in this chain.
        pub fn contains(&self, name: &str) -> bool {
            self.names.iter().any(|n| n == name)
        }

        /// Beans currently being created, outermost first.
        pub fn current(&self) -> &[String] {
            &self.names
        }
    }

    /// Dependency graph analysis result
    #[derive(Debug)]
    pub enum DependencyValidationError {
        /// Circular dependency detected
        CircularDependency {
            /// The dependency chain forming the cycle
            cycle: Vec<String>,
        },
        /// Missing dependency detected
        MissingDependency {
            /// The bean that requires the dependency
            bean: String,
            /// The missing dependency
            missing: String,
        },
    }

    impl std::fmt::Display for DependencyValidationError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::CircularDependency { cycle } => {
                    write!(f, "Circular dependency detected: {}", cycle.join(" -> "))
                }
                Self::MissingDependency { bean, missing } => {
                    write!(f, "Bean '{}' depends on '{}' which is not registered", bean, missing)
                }
            }
        }
    }

    /// Validates dependency graph for circular dependencies and missing beans
    ///
    /// # Arguments
    ///
    /// * `dependencies` - Map of bean name to the names of its dependencies
    ///
    /// # Returns
    ///
    /// Returns Ok(()) if no issues found, or Err with the first detected issue.
    /// Beans are visited in name order so the reported issue is stable.
    pub fn validate_dependency_graph(
        dependencies: &HashMap<String, Vec<String>>,
    ) -> Result<(), DependencyValidationError> {
        let mut names: Vec<&String> = dependencies.keys().collect();
        names.sort();

        for bean_name in &names {
            for dep in &dependencies[*bean_name] {
                if !dependencies.contains_key(dep) {
                    return Err(DependencyValidationError::MissingDependency {
                        bean: (*bean_name).clone(),
                        missing: dep.clone(),
                    });
                }
            }
        }

        let mut visited = HashSet::new();
        let mut rec_stack = Vec::new();

        for bean_name in names {
            if !visited.contains(bean_name) {
                if let Some(cycle) =
                    detect_cycle_dfs(bean_name, dependencies, &mut visited, &mut rec_stack)
                {
                    return Err(DependencyValidationError::CircularDependency { cycle });
                }
            }
        }

        Ok(())
    }

    /// DFS-based cycle detection
    fn detect_cycle_dfs(
        node: &str,
        graph: &HashMap<String, Vec<String>>,
        visited: &mut HashSet<String>,
        rec_stack: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        visited.insert(node.to_string());
        rec_stack.push(node.to_string());

        if let Some(deps) = graph.get(node) {
            for dep in deps {
                if let Some(start_idx) = rec_stack.iter().position(|x| x == dep) {
                    let mut cycle = rec_stack[start_idx..].to_vec();
                    cycle.push(dep.to_string());
                    return Some(cycle);
                }
                if !visited.contains(dep) {
                    if let Some(cycle) = detect_cycle_dfs(dep, graph, visited, rec_stack) {
                        return Some(cycle);
                    }
                }
            }
        }

        rec_stack.pop();
        None
    }
}

use std::collections::BTreeMap;
use std::fmt;

use annotype_common::TypeResult;
use serde::{Deserialize, Serialize};

/// Class key for module-level functions.
pub const GLOBAL: &str = "global";
/// Parameter key for a function's return annotation.
pub const RETURN: &str = "return";

/// parameter name (or `return`) -> values, in collection order
pub type FunctionLevel<T> = BTreeMap<String, Vec<T>>;
/// function name -> parameters
pub type ClassLevel<T> = BTreeMap<String, FunctionLevel<T>>;
/// class name (or `global`) -> functions
pub type ModuleLevel<T> = BTreeMap<String, ClassLevel<T>>;
/// module name -> classes
pub type ResultTable<T> = BTreeMap<String, ModuleLevel<T>>;

pub type RawResults = ResultTable<String>;
pub type Results = ResultTable<TypeResult>;

/// module -> class (or `global`) -> function -> parameter names to inspect.
pub type QueryTable = BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<String>>>>;

/// Parameter names of one module's functions and methods, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSignatures {
    #[serde(default)]
    pub functions: BTreeMap<String, Vec<String>>,
    /// class name -> method name -> parameter names
    #[serde(default)]
    pub classes: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

/// Where an annotation was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site<'a> {
    pub module: &'a str,
    pub class: &'a str,
    pub function: &'a str,
    pub parameter: &'a str,
}

impl fmt::Display for Site<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.module, self.class, self.function, self.parameter
        )
    }
}

/// Build the table of parameters to inspect.
///
/// Module-level functions are filed under [`GLOBAL`]. A method's leading
/// `self` or `cls` is dropped. Every function also queries [`RETURN`].
/// Modules and classes without functions are left out.
pub fn build_query(signatures: &BTreeMap<String, ModuleSignatures>) -> QueryTable {
    let mut query = QueryTable::new();

    for (module_name, module) in signatures {
        let mut classes = BTreeMap::new();

        let functions: BTreeMap<String, Vec<String>> = module
            .functions
            .iter()
            .map(|(name, params)| (name.clone(), with_return(params)))
            .collect();
        if !functions.is_empty() {
            classes.insert(GLOBAL.to_string(), functions);
        }

        for (class_name, methods) in &module.classes {
            let methods: BTreeMap<String, Vec<String>> = methods
                .iter()
                .map(|(name, params)| {
                    let params = match params.split_first() {
                        Some((first, rest)) if first == "self" || first == "cls" => rest,
                        _ => params.as_slice(),
                    };
                    (name.clone(), with_return(params))
                })
                .collect();
            if !methods.is_empty() {
                classes.insert(class_name.clone(), methods);
            }
        }

        if !classes.is_empty() {
            query.insert(module_name.clone(), classes);
        }
    }

    query
}

fn with_return(params: &[String]) -> Vec<String> {
    let mut params = params.to_vec();
    params.push(RETURN.to_string());
    params
}

/// Project collected annotation strings onto `query`.
///
/// Every queried parameter gets an entry, empty when nothing was collected
/// for it; anything collected outside the query is ignored.
pub fn collect_raw(query: &QueryTable, collected: &RawResults) -> RawResults {
    let mut raw = RawResults::new();

    for (module_name, classes) in query {
        let module_entry = raw.entry(module_name.clone()).or_default();
        for (class_name, functions) in classes {
            let class_entry = module_entry.entry(class_name.clone()).or_default();
            for (function_name, parameters) in functions {
                let function_entry = class_entry.entry(function_name.clone()).or_default();
                for parameter in parameters {
                    let values = collected
                        .get(module_name)
                        .and_then(|m| m.get(class_name))
                        .and_then(|c| c.get(function_name))
                        .and_then(|f| f.get(parameter))
                        .cloned()
                        .unwrap_or_default();
                    function_entry.insert(parameter.clone(), values);
                }
            }
        }
    }

    raw
}

/// Number of leaf values in a table.
pub fn count_values<T>(table: &ResultTable<T>) -> usize {
    table
        .values()
        .flat_map(|m| m.values())
        .flat_map(|c| c.values())
        .flat_map(|f| f.values())
        .map(Vec::len)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn signatures() -> BTreeMap<String, ModuleSignatures> {
        let mut module = ModuleSignatures::default();
        module
            .functions
            .insert("load".to_string(), names(&["path", "strict"]));
        let mut methods = BTreeMap::new();
        methods.insert("__init__".to_string(), names(&["self", "root"]));
        methods.insert("create".to_string(), names(&["cls"]));
        methods.insert("join".to_string(), names(&["other", "self"]));
        module.classes.insert("Store".to_string(), methods);
        module.classes.insert("Empty".to_string(), BTreeMap::new());

        let mut signatures = BTreeMap::new();
        signatures.insert("pkg.store".to_string(), module);
        signatures.insert("pkg.empty".to_string(), ModuleSignatures::default());
        signatures
    }

    #[test]
    fn query_files_functions_and_methods() {
        let query = build_query(&signatures());
        assert!(!query.contains_key("pkg.empty"));

        let module = &query["pkg.store"];
        assert!(!module.contains_key("Empty"));
        assert_eq!(module[GLOBAL]["load"], names(&["path", "strict", "return"]));
        assert_eq!(module["Store"]["__init__"], names(&["root", "return"]));
        assert_eq!(module["Store"]["create"], names(&["return"]));
        // Only a leading self is a receiver.
        assert_eq!(module["Store"]["join"], names(&["other", "self", "return"]));
    }

    #[test]
    fn collect_raw_fills_every_queried_parameter() {
        let query = build_query(&signatures());

        let mut collected = RawResults::new();
        collected
            .entry("pkg.store".to_string())
            .or_default()
            .entry(GLOBAL.to_string())
            .or_default()
            .entry("load".to_string())
            .or_default()
            .insert("path".to_string(), names(&["str", "pathlib.Path"]));
        collected
            .entry("pkg.other".to_string())
            .or_default()
            .entry(GLOBAL.to_string())
            .or_default()
            .entry("f".to_string())
            .or_default()
            .insert("x".to_string(), names(&["int"]));

        let raw = collect_raw(&query, &collected);
        assert!(!raw.contains_key("pkg.other"));
        let load = &raw["pkg.store"][GLOBAL]["load"];
        assert_eq!(load["path"], names(&["str", "pathlib.Path"]));
        assert!(load["strict"].is_empty());
        assert!(load[RETURN].is_empty());
        assert!(raw["pkg.store"]["Store"]["create"][RETURN].is_empty());
        assert_eq!(count_values(&raw), 2);
    }

    #[test]
    fn site_display() {
        let site = Site {
            module: "pkg.mod",
            class: GLOBAL,
            function: "f",
            parameter: RETURN,
        };
        assert_eq!(site.to_string(), "pkg.mod.global.f.return");
    }
}

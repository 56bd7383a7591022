//! Names known to every FEEL scope

/// Built-in FEEL functions implemented by the runtime
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "not",
    "string length",
    "substring",
    "upper case",
    "lower case",
    "contains",
    "starts with",
    "ends with",
    "string",
    "number",
    "count",
    "sum",
    "min",
    "max",
    "mean",
    "all",
    "any",
    "append",
    "concatenate",
    "list contains",
    "distinct values",
    "flatten",
    "reverse",
    "abs",
    "floor",
    "ceiling",
    "decimal",
    "round half up",
    "round half down",
    "round up",
    "round down",
    "modulo",
    "sqrt",
    "is defined",
    "get value",
];

/// FEEL built-in type names accepted as `typeRef`
pub const BUILTIN_TYPES: &[&str] = &[
    "Any",
    "string",
    "number",
    "boolean",
    "context",
    "list",
    "function",
    "date",
    "time",
    "date and time",
    "dateTime",
    "duration",
    "dayTimeDuration",
    "yearMonthDuration",
    "days and time duration",
    "years and months duration",
];

pub fn is_builtin_function(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(&name)
}

pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

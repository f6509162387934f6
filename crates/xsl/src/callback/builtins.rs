//! Callbacks for common 2.0 functions with no 1.0 counterpart.

use super::{CallbackRegistry, CallbackValue, check_arity};
use crate::error::XslError;
use regex::{Regex, RegexBuilder};

pub(super) fn register(registry: &mut CallbackRegistry) {
    registry.register("upper-case", upper_case);
    registry.register("lower-case", lower_case);
    registry.register("ends-with", ends_with);
    registry.register("abs", abs);
    registry.register("matches", matches);
    registry.register("replace", replace);
}

fn upper_case(args: &[CallbackValue]) -> Result<CallbackValue, XslError> {
    check_arity("upper-case", args, 1, 1)?;
    Ok(args[0].to_string().to_uppercase().into())
}

fn lower_case(args: &[CallbackValue]) -> Result<CallbackValue, XslError> {
    check_arity("lower-case", args, 1, 1)?;
    Ok(args[0].to_string().to_lowercase().into())
}

fn ends_with(args: &[CallbackValue]) -> Result<CallbackValue, XslError> {
    check_arity("ends-with", args, 2, 2)?;
    let s1 = args[0].to_string();
    let s2 = args[1].to_string();
    Ok(s1.ends_with(&s2).into())
}

fn abs(args: &[CallbackValue]) -> Result<CallbackValue, XslError> {
    check_arity("abs", args, 1, 1)?;
    Ok(args[0].to_number().abs().into())
}

fn matches(args: &[CallbackValue]) -> Result<CallbackValue, XslError> {
    check_arity("matches", args, 2, 3)?;
    let regex = compile_pattern("matches", &args[1], args.get(2))?;
    Ok(regex.is_match(&args[0].to_string()).into())
}

fn replace(args: &[CallbackValue]) -> Result<CallbackValue, XslError> {
    check_arity("replace", args, 3, 4)?;
    let regex = compile_pattern("replace", &args[1], args.get(3))?;
    if regex.is_match("") {
        return Err(XslError::invalid_argument(
            "replace",
            "Pattern matches a zero-length string",
        ));
    }
    let input = args[0].to_string();
    let replacement = args[2].to_string();
    Ok(regex.replace_all(&input, replacement.as_str()).into_owned().into())
}

/// Builds a regex from a pattern and optional flags (`i`, `m`, `s`, `x`).
fn compile_pattern(
    function: &str,
    pattern: &CallbackValue,
    flags: Option<&CallbackValue>,
) -> Result<Regex, XslError> {
    let mut builder = RegexBuilder::new(&pattern.to_string());
    if let Some(flags) = flags {
        for flag in flags.to_string().chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                other => {
                    return Err(XslError::invalid_argument(
                        function,
                        format!("Unknown regex flag '{}'", other),
                    ));
                }
            };
        }
    }
    builder
        .build()
        .map_err(|e| XslError::invalid_argument(function, format!("Invalid pattern: {}", e)))
}

//! Control flow and integer tests.
//!
//! `repeat`, `for each` and `check condition` expand some parameters more
//! than once or not at all; every expansion gets its own fragment.

use crate::errors::{ErrorKind, ExpansionError};
use crate::macros::Macro;
use crate::runtime::ExpansionContext;

use super::helpers::render_bool;
use super::PrimitiveCall;

/// Name bound to the current item inside a `for each` pattern.
pub const ITEM_BINDING: &str = "it";

pub fn repeat(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    let count = call.expand_integer(ctx, 0)?;
    if count <= 0 {
        return Err(call.error(ErrorKind::InvalidIntegerRange { value: count }));
    }
    let mut output = String::new();
    for _ in 0..count {
        output.push_str(&call.expand(ctx, 1)?);
    }
    Ok(output)
}

pub fn for_each(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    let Some((pattern, items)) = call.parameters().split_last() else {
        return Ok(String::new());
    };
    let pattern_origin = call.parameter_origin(items.len());

    let mut output = String::new();
    for index in 0..items.len() {
        let item = call.expand(ctx, index)?;
        let binding = Macro::constant(ITEM_BINDING, item);
        output.push_str(&ctx.expand_fragment(pattern, vec![binding], &pattern_origin)?);
    }
    Ok(output)
}

pub fn check_condition(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    let condition = call.expand(ctx, 0)?;
    match condition.trim() {
        "true" => call.expand(ctx, 1),
        "false" => call.expand(ctx, 2),
        other => Err(call.error(ErrorKind::InvalidConditionValue {
            value: other.to_string(),
        })),
    }
}

pub fn is_zero(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    Ok(render_bool(call.expand_integer(ctx, 0)? == 0))
}

fn compare(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
    test: fn(i64, i64) -> bool,
) -> Result<String, ExpansionError> {
    let left = call.expand_integer(ctx, 0)?;
    let right = call.expand_integer(ctx, 1)?;
    Ok(render_bool(test(left, right)))
}

pub fn is_greater_than(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    compare(call, ctx, |left, right| left > right)
}

pub fn is_less_than(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    compare(call, ctx, |left, right| left < right)
}

pub fn is_equal(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    compare(call, ctx, |left, right| left == right)
}

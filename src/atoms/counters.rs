//! Counter primitives and integer arithmetic.
//!
//! Counter names are used exactly as their parameter expands, surrounding
//! whitespace included. Values are trimmed before they are parsed.

use crate::errors::{ErrorKind, ExpansionError};
use crate::runtime::ExpansionContext;

use super::PrimitiveCall;

pub fn new_counter(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    let name = call.expand(ctx, 0)?;
    if !ctx.counters_mut().create(&name) {
        return Err(call.error(ErrorKind::DuplicateCounter { name }));
    }
    log::debug!("declared counter '{}'", name);
    Ok(String::new())
}

pub fn set_counter(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    let name = call.expand(ctx, 0)?;
    let value = call.expand_integer(ctx, 1)?;
    if !ctx.counters_mut().set(&name, value) {
        return Err(call.error(ErrorKind::CounterNotFound { name }));
    }
    Ok(String::new())
}

pub fn counter(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    let name = call.expand(ctx, 0)?;
    let Some(value) = ctx.counters().get(&name) else {
        return Err(call.error(ErrorKind::CounterNotFound { name }));
    };
    Ok(value.to_string())
}

pub fn increment(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    let value = call.expand_integer(ctx, 0)?;
    Ok(call.checked(value.checked_add(1), value)?.to_string())
}

pub fn decrement(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    let value = call.expand_integer(ctx, 0)?;
    Ok(call.checked(value.checked_sub(1), value)?.to_string())
}

pub fn increment_counter(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    adjust_counter(call, ctx, 1)
}

pub fn decrement_counter(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    adjust_counter(call, ctx, -1)
}

fn adjust_counter(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
    delta: i64,
) -> Result<String, ExpansionError> {
    let name = call.expand(ctx, 0)?;
    let Some(value) = ctx.counters().get(&name) else {
        return Err(call.error(ErrorKind::CounterNotFound { name }));
    };
    let adjusted = call.checked(value.checked_add(delta), value)?;
    ctx.counters_mut().set(&name, adjusted);
    Ok(String::new())
}

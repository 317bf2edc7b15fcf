//! Definitions, comments and fixed text.
//!
//! None of these expand their parameter: `define` parses it as a definition,
//! `comment` drops it and `no expand` emits it as written.

use crate::errors::{ErrorKind, ExpansionError};
use crate::runtime::ExpansionContext;
use crate::syntax::parse_definition;

use super::PrimitiveCall;

pub fn comment(
    _call: &PrimitiveCall<'_>,
    _ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    Ok(String::new())
}

pub fn define(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    install(call, ctx, false)
}

pub fn global_define(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    install(call, ctx, true)
}

fn install(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
    global: bool,
) -> Result<String, ExpansionError> {
    let macro_def = parse_definition(call.raw(0), &call.parameter_origin(0))?;
    let (name, arity) = (macro_def.name().to_string(), macro_def.arity());

    let inserted = if global {
        ctx.scopes_mut().insert_global(macro_def)
    } else {
        ctx.scopes_mut().insert_current(macro_def)
    };
    if !inserted {
        let scope = if global { "global" } else { "current" };
        return Err(call.error(ErrorKind::DuplicateMacro {
            name,
            arity,
            scope: scope.to_string(),
        }));
    }
    Ok(String::new())
}

pub fn new_line(
    _call: &PrimitiveCall<'_>,
    _ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    Ok("\n".to_string())
}

pub fn new_page(
    _call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    Ok(ctx.config().page_marker.clone())
}

pub fn no_expand(
    call: &PrimitiveCall<'_>,
    _ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    Ok(call.raw(0).to_string())
}

//! Primitives backed by the context's capabilities.

use crate::errors::{ErrorKind, ExpansionError};
use crate::runtime::ExpansionContext;

use super::PrimitiveCall;

/// Asks the user to edit a text; the reply is expanded again on request.
pub fn input_text(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    let title = call.expand(ctx, 0)?;
    let initial = call.expand(ctx, 1)?;
    let reply = ctx.prompt().ask_text(&title, &initial);
    if !reply.expand {
        return Ok(reply.text);
    }
    let origin = format!("reply to '{}'", call.name());
    ctx.expand_fragment(&reply.text, Vec::new(), &origin)
}

pub fn send_message(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    let title = call.expand(ctx, 0)?;
    let body = call.expand(ctx, 1)?;
    ctx.prompt().notify(&title, &body);
    Ok(String::new())
}

pub fn get_url(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    let locator = call.expand(ctx, 0)?;
    ctx.retriever().fetch(&locator).map_err(|error| {
        let reason = match std::error::Error::source(&error) {
            Some(cause) => format!("{}: {}", error, cause),
            None => error.to_string(),
        };
        call.error(ErrorKind::Retrieval {
            locator: locator.clone(),
            reason,
        })
    })
}

use std::fmt;

use tracing::trace;

use crate::{
    ast::{Expr, Unit},
    codegen::{emitter::Emitter, surface},
    dialect::Dialect,
    error::Error,
};

/// Prints `unit` in `dialect` to `sink`.
///
/// The text is built in memory first and reaches the sink only once the
/// whole unit printed, so a failure leaves the sink untouched.
pub fn generate<W>(dialect: Dialect, filename: &str, unit: &Unit, sink: &mut W) -> Result<(), Error>
where
    W: fmt::Write,
{
    type BraceEmitter<'a, W> = Emitter<'a, W, surface::Brace>;
    type BlockEmitter<'a, W> = Emitter<'a, W, surface::Block>;

    trace!(filename, %dialect, "generating");
    let mut buf = String::with_capacity(4096);
    match dialect {
        Dialect::Brace => BraceEmitter::new(&mut buf).emit_unit(unit)?,
        Dialect::Block => BlockEmitter::new(&mut buf).emit_unit(unit)?,
    }
    sink.write_str(&buf)?;
    Ok(())
}

/// Prints a single expression in `dialect`.
pub fn generate_expr(dialect: Dialect, expr: &Expr) -> Result<String, Error> {
    let mut buf = String::new();
    match dialect {
        Dialect::Brace => Emitter::<_, surface::Brace>::new(&mut buf).emit_expression(expr)?,
        Dialect::Block => Emitter::<_, surface::Block>::new(&mut buf).emit_expression(expr)?,
    }
    Ok(buf)
}

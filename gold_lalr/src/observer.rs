//! Observer hooks (§4.H): three optional, cooperative callbacks the driver
//! invokes at defined points. Modeled as optional boxed closures rather than
//! a trait with default methods, so an embedder wires up only the hooks it
//! cares about without declaring a type for the rest (§9 DESIGN NOTES offers
//! both shapes; a data-driven runtime engine with no grammar-specific
//! generated type to hang a trait impl off of favours the closure form).

use gold_cgt::model::{LrStateId, Span, SymbolId, Token};

/// A read-only view of one stack frame, passed to `on_shift`/`on_reduce`
/// (§4.H: "Stack snapshots are read-only; mutation by observers is
/// undefined").
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub lr_state: LrStateId,
    symbol: Option<SymbolId>,
    span: Span,
    _marker: std::marker::PhantomData<&'a ()>,
}

impl<'a> FrameView<'a> {
    pub(crate) fn new(lr_state: LrStateId, symbol: Option<SymbolId>, span: Span) -> Self {
        Self {
            lr_state,
            symbol,
            span,
            _marker: std::marker::PhantomData,
        }
    }

    /// `None` only for the bottom-of-stack `INITIAL_STATE` sentinel frame.
    pub fn symbol(&self) -> Option<SymbolId> {
        self.symbol
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// `on_token` fires after every lexed token, including skippables and
/// group-synthesized tokens. `on_shift` fires after the driver has committed
/// to the shift but before the look-ahead slot is cleared. `on_reduce` fires
/// after the reduce has popped, built the new node, and pushed the
/// post-goto frame, so the stack snapshot it receives already reflects the
/// reduce (§4.H: "after a successful reduce has modified the stack").
#[derive(Default)]
pub struct Observers<'a> {
    pub on_token: Option<Box<dyn FnMut(&Token) + 'a>>,
    pub on_shift: Option<Box<dyn FnMut(LrStateId, &Token, &[FrameView]) + 'a>>,
    pub on_reduce: Option<Box<dyn FnMut(LrStateId, &Token, &[FrameView]) + 'a>>,
}

impl<'a> Observers<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_on_token(mut self, f: impl FnMut(&Token) + 'a) -> Self {
        self.on_token = Some(Box::new(f));
        self
    }

    pub fn with_on_shift(mut self, f: impl FnMut(LrStateId, &Token, &[FrameView]) + 'a) -> Self {
        self.on_shift = Some(Box::new(f));
        self
    }

    pub fn with_on_reduce(mut self, f: impl FnMut(LrStateId, &Token, &[FrameView]) + 'a) -> Self {
        self.on_reduce = Some(Box::new(f));
        self
    }

    pub(crate) fn notify_token(&mut self, token: &Token) {
        if let Some(cb) = self.on_token.as_mut() {
            cb(token);
        }
    }

    pub(crate) fn notify_shift(&mut self, origin: LrStateId, look_ahead: &Token, stack: &[FrameView]) {
        if let Some(cb) = self.on_shift.as_mut() {
            cb(origin, look_ahead, stack);
        }
    }

    pub(crate) fn notify_reduce(&mut self, origin: LrStateId, look_ahead: &Token, stack: &[FrameView]) {
        if let Some(cb) = self.on_reduce.as_mut() {
            cb(origin, look_ahead, stack);
        }
    }
}

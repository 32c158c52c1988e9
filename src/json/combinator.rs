//! Purpose: Named sequencing combinators for optional values.
//! Exports: `bind`, `map`, `apply`, `pure`.
//! Role: Building blocks for applicative object construction in `Decode`
//! Role: impls; the first absent field short-circuits the whole construction.
//! Invariants: No combinator ever invokes its function argument on an absent
//! Invariants: input.

/// Sequences a fallible step after an optional value. `None` propagates
/// unchanged and `f` is never invoked.
pub fn bind<A, B, F>(value: Option<A>, f: F) -> Option<B>
where
    F: FnOnce(A) -> Option<B>,
{
    match value {
        Some(inner) => f(inner),
        None => None,
    }
}

/// Lifts a plain unary function over an optional value.
pub fn map<A, B, F>(f: F, value: Option<A>) -> Option<B>
where
    F: FnOnce(A) -> B,
{
    match value {
        Some(inner) => Some(f(inner)),
        None => None,
    }
}

/// Applies an optional function to an optional value. Absence on either side
/// yields absence; multi-field constructors chain through repeated `apply`.
pub fn apply<A, B, F>(f: Option<F>, value: Option<A>) -> Option<B>
where
    F: FnOnce(A) -> B,
{
    match (f, value) {
        (Some(func), Some(inner)) => Some(func(inner)),
        _ => None,
    }
}

/// Wraps a plain value as present.
pub fn pure<A>(value: A) -> Option<A> {
    Some(value)
}

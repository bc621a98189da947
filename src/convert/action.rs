//! Verbs and the converter actions built for them

use crate::cache::{Downgrade, ForwardAction};
use crate::convert::datum::Datum;
use crate::error::{ConvcacheError, ConvcacheResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};

/// Kind of converter being built for a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// JSON to [`Datum`]
    Decode,
    /// [`Datum`] to JSON
    Encode,
    /// Does a JSON value conform to the type
    Check,
    /// Is a [`Datum`] a valid value of the type
    Inspect,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::Check => "check",
            Self::Inspect => "inspect",
        };
        write!(f, "{}", name)
    }
}

pub type DecodeFn = dyn Fn(&Value) -> ConvcacheResult<Datum> + Send + Sync;
pub type EncodeFn = dyn Fn(&Datum) -> ConvcacheResult<Value> + Send + Sync;
pub type CheckFn = dyn Fn(&Value) -> ConvcacheResult<bool> + Send + Sync;
pub type InspectFn = dyn Fn(&Datum) -> ConvcacheResult<bool> + Send + Sync;

/// A built converter, cheap to clone and shareable across threads
#[derive(Clone)]
pub enum Action {
    Decode(Arc<DecodeFn>),
    Encode(Arc<EncodeFn>),
    Check(Arc<CheckFn>),
    Inspect(Arc<InspectFn>),
}

/// Non-owning form of an [`Action`], held by resolved forward placeholders
pub enum WeakAction {
    Decode(Weak<DecodeFn>),
    Encode(Weak<EncodeFn>),
    Check(Weak<CheckFn>),
    Inspect(Weak<InspectFn>),
}

impl Downgrade for Action {
    type Weak = WeakAction;

    fn downgrade(&self) -> WeakAction {
        match self {
            Self::Decode(f) => WeakAction::Decode(Arc::downgrade(f)),
            Self::Encode(f) => WeakAction::Encode(Arc::downgrade(f)),
            Self::Check(f) => WeakAction::Check(Arc::downgrade(f)),
            Self::Inspect(f) => WeakAction::Inspect(Arc::downgrade(f)),
        }
    }

    fn upgrade(weak: &WeakAction) -> Option<Self> {
        match weak {
            WeakAction::Decode(f) => f.upgrade().map(Self::Decode),
            WeakAction::Encode(f) => f.upgrade().map(Self::Encode),
            WeakAction::Check(f) => f.upgrade().map(Self::Check),
            WeakAction::Inspect(f) => f.upgrade().map(Self::Inspect),
        }
    }
}

impl Action {
    pub fn decoder(f: impl Fn(&Value) -> ConvcacheResult<Datum> + Send + Sync + 'static) -> Self {
        Self::Decode(Arc::new(f))
    }

    pub fn encoder(f: impl Fn(&Datum) -> ConvcacheResult<Value> + Send + Sync + 'static) -> Self {
        Self::Encode(Arc::new(f))
    }

    pub fn checker(f: impl Fn(&Value) -> ConvcacheResult<bool> + Send + Sync + 'static) -> Self {
        Self::Check(Arc::new(f))
    }

    pub fn inspector(f: impl Fn(&Datum) -> ConvcacheResult<bool> + Send + Sync + 'static) -> Self {
        Self::Inspect(Arc::new(f))
    }

    /// An action that delegates to whatever `forward` resolves to
    ///
    /// The placeholder is only consulted when the action runs, so it may be
    /// embedded while the target is still being built. It does not keep the
    /// target alive.
    pub fn forward(verb: Verb, forward: ForwardAction<Action>) -> Self {
        match verb {
            Verb::Decode => Self::decoder(move |value| forward.target()?.decode(value)),
            Verb::Encode => Self::encoder(move |datum| forward.target()?.encode(datum)),
            Verb::Check => Self::checker(move |value| forward.target()?.check(value)),
            Verb::Inspect => Self::inspector(move |datum| forward.target()?.inspect(datum)),
        }
    }

    pub fn verb(&self) -> Verb {
        match self {
            Self::Decode(_) => Verb::Decode,
            Self::Encode(_) => Verb::Encode,
            Self::Check(_) => Verb::Check,
            Self::Inspect(_) => Verb::Inspect,
        }
    }

    pub fn decode(&self, value: &Value) -> ConvcacheResult<Datum> {
        match self {
            Self::Decode(f) => f(value),
            _ => Err(self.mismatch(Verb::Decode)),
        }
    }

    pub fn encode(&self, datum: &Datum) -> ConvcacheResult<Value> {
        match self {
            Self::Encode(f) => f(datum),
            _ => Err(self.mismatch(Verb::Encode)),
        }
    }

    pub fn check(&self, value: &Value) -> ConvcacheResult<bool> {
        match self {
            Self::Check(f) => f(value),
            _ => Err(self.mismatch(Verb::Check)),
        }
    }

    pub fn inspect(&self, datum: &Datum) -> ConvcacheResult<bool> {
        match self {
            Self::Inspect(f) => f(datum),
            _ => Err(self.mismatch(Verb::Inspect)),
        }
    }

    fn mismatch(&self, requested: Verb) -> ConvcacheError {
        ConvcacheError::VerbMismatch {
            requested: requested.to_string(),
            actual: self.verb().to_string(),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} action>", self.verb())
    }
}

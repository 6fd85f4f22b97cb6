//! Reactivity primitives.
//!
//! - [`Observable`] - value whose writes run handlers before committing
//! - [`ReactiveData`] - keyed observables backing a component's data
//! - [`ComputedProperties`] - uncached getters bound to a receiver
//!
//! Everything here is synchronous and single-threaded. A write returns only
//! after every handler it triggered (and every write those handlers made)
//! has run to completion.

mod computed;
mod data;
mod observable;

pub use computed::{ComputedProperties, Getter};
pub use data::ReactiveData;
pub use observable::{ChangeHandler, Observable, Subscription};

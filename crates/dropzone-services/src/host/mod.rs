//! Host repository adapters.

pub mod memory;

pub use memory::{
    FailureSpec, Grant, HostFixture, HostOperation, InMemoryHost, InjectedFailure,
};

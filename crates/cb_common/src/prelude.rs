//! Common type aliases

// a few of these are unused so far, kept for symmetry with the rest
#![allow(unused)]

pub use std::collections::VecDeque;
pub use std::sync::atomic::{Ordering as AtomicOrdering, *};
// std synchronization types
pub use std::sync::{Arc, Condvar, Mutex, MutexGuard, Once, OnceLock, RwLock, Weak};

// anyhow error handling
pub use anyhow::{anyhow, bail, ensure, Context, Result};
// hashbrown map types
pub use hashbrown::{HashMap, HashSet};

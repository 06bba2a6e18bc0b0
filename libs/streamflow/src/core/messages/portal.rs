// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Stable index of a portal in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortalId(usize);

impl PortalId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Typed handle for teleport messages to every worker registered on the
/// portal. `R` is the body type of the recipients; messages are closures over
/// `&mut R`.
///
/// Portals are created by [`GraphBuilder::portal`] and copied into the work
/// routines that send through them.
///
/// [`GraphBuilder::portal`]: crate::core::GraphBuilder::portal
pub struct Portal<R> {
    id: PortalId,
    _recipient: PhantomData<fn(&mut R)>,
}

impl<R> Portal<R> {
    pub(crate) fn new(id: PortalId) -> Self {
        Self {
            id,
            _recipient: PhantomData,
        }
    }

    pub fn id(&self) -> PortalId {
        self.id
    }
}

impl<R> Clone for Portal<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Portal<R> {}

impl<R> fmt::Debug for Portal<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Portal")
            .field("id", &self.id)
            .field("recipient", &std::any::type_name::<R>())
            .finish()
    }
}

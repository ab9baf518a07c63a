//! # Store Messages
//!
//! This module defines the message types exchanged between the `StoreClient` and the
//! `StoreActor`.

use crate::framework::{Record, StoreError};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store actor.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Request sent to the [`StoreActor`](crate::framework::StoreActor).
///
/// The variants mirror the [`RecordStore`](crate::framework::RecordStore) capability plus the
/// two administrative operations the in-process store offers:
///
/// - **Get**: point lookup by id.
/// - **GetAll**: every stored record.
/// - **Insert**: persist a new record; fails if the id is taken.
/// - **Replace**: upsert a whole record, returning the previous snapshot.
/// - **Shutdown**: stop the actor even if clients are still alive.
#[derive(Debug)]
pub enum StoreRequest<T: Record> {
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    GetAll {
        respond_to: Response<Vec<T>>,
    },
    Insert {
        record: T,
        respond_to: Response<()>,
    },
    Replace {
        record: T,
        respond_to: Response<Option<T>>,
    },
    Shutdown,
}

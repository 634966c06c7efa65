//! Workbook lifecycle
//!
//! Reconciles declared workbook configuration against Azure.
//!
//! # Module Structure
//!
//! - [`identity`] - parses remote-issued resource identities
//! - [`hidden_link`] - encodes the parent component link as a tag
//! - [`guard`] - refuses to create over an existing workbook
//! - [`reconciler`] - create-or-update of the desired state
//! - [`reader`] - fetches and normalizes remote state
//! - [`deleter`] - removal, treating absence as success
//! - [`lifecycle`] - the [`Workbooks`] facade tying them together
//!
//! # Example
//!
//! ```ignore
//! use azwb::workbook::Workbooks;
//!
//! async fn example(client: azwb::azure::AzureClient, desired: azwb::workbook::DesiredState) -> anyhow::Result<()> {
//!     let workbooks = Workbooks::new(client);
//!     let applied = workbooks.apply(&desired, None).await?;
//!     println!("{}", applied.identity);
//!     Ok(())
//! }
//! ```

pub mod deleter;
pub mod error;
pub mod guard;
pub mod hidden_link;
pub mod identity;
pub mod lifecycle;
pub mod model;
pub mod reader;
pub mod reconciler;
pub mod remote;

#[cfg(test)]
pub(crate) mod testing;

pub use deleter::Deleter;
pub use error::{WorkbookError, WorkbookResult};
pub use guard::ExistenceGuard;
pub use identity::ResourceId;
pub use lifecycle::{Applied, Workbooks};
pub use model::{DesiredState, RemoteState, Workbook, WorkbookKind, WorkbookProperties};
pub use reader::Reader;
pub use reconciler::Reconciler;
pub use remote::{Lookup, RemoteClient};

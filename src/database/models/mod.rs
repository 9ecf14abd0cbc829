pub mod client;
pub mod invoice;
pub mod project;
pub mod task;
pub mod user;

pub use client::{Client, ClientSummary};
pub use invoice::{Invoice, InvoiceDetail, InvoiceItem, Payment};
pub use project::{Project, ProjectDetail};
pub use task::{OpenTask, Task};
pub use user::User;

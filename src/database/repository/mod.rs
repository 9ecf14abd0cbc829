// repository - parameterized SQL per resource

pub mod clients;
pub mod contact;
pub mod dashboard;
pub mod invoices;
pub mod projects;
pub mod tasks;
pub mod users;

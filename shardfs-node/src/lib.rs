mod fanout;
mod relay;
mod server;

pub use server::Coordinator;

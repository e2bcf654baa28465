pub mod backend;
pub mod cdp;
pub mod dom;

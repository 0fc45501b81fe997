pub mod download;
pub mod error;
pub mod http_client;
pub mod types;

#[cfg(test)]
pub(crate) mod test_server;

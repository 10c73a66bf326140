pub mod blob_server;

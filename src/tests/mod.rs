mod detail;
mod store;

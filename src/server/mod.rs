// HTTP surface for the aggregator — resolve, listing, and stats endpoints.

pub mod handler;

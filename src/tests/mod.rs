
mod batch;
mod dataset;
mod ncut;

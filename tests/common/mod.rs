pub mod test_samples;

mod test_builder_basic;

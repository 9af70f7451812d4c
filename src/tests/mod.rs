mod event_tests;
mod entity_set_tests;

//! Integration tests driven through `InteractionController` and `BoardSerializer`.

mod board_workflow_tests;

mod transfer_token_tests;

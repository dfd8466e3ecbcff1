use gemini_client::mask_token;

#[test]
fn short_tokens_are_fully_masked() {
    assert_eq!(mask_token(""), "***");
    assert_eq!(mask_token("abc"), "***");
    assert_eq!(mask_token("exactly11ch"), "***");
}

#[test]
fn long_tokens_keep_head_and_tail() {
    assert_eq!(mask_token("AIzaSyA-1234567890abcd"), "AIzaSyA***abcd");
    let masked = mask_token("sk-verylongsecrettoken");
    assert!(masked.starts_with("sk-very"));
    assert!(masked.contains("***"));
    assert!(!masked.contains("longsecret"));
}

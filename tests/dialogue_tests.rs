use anyhow::Result;

use cardsmith::dialogue::{validate_description, ChatState, MAX_DESCRIPTION_INPUT};

/// Integration test for product description validation
#[tokio::test]
async fn test_description_validation() -> Result<()> {
    // Valid descriptions
    assert!(validate_description("Wireless headphones, 30h battery").is_ok());
    assert!(validate_description("  ceramic mug  ").is_ok());

    // Invalid descriptions
    assert!(validate_description("").is_err());
    assert!(validate_description("   ").is_err());
    assert!(validate_description(&"a".repeat(MAX_DESCRIPTION_INPUT + 1)).is_err());

    Ok(())
}

/// Validated text comes back trimmed
#[tokio::test]
async fn test_description_is_trimmed() -> Result<()> {
    let text = validate_description("  handmade soap  ").map_err(anyhow::Error::msg)?;
    assert_eq!(text, "handmade soap");

    Ok(())
}

/// A fresh dialogue starts idle, not waiting for input
#[tokio::test]
async fn test_default_chat_state_is_idle() -> Result<()> {
    assert_eq!(ChatState::default(), ChatState::Idle);

    Ok(())
}

mod common;

use anyhow::Result;
use common::{create_user, test_service};
use soldo::application::AppError;

#[tokio::test]
async fn test_finalize_signup_creates_oauth_account() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let user = service
        .finalize_signup("newuser123", "newuser@gmail.com")
        .await?;
    assert_eq!(user.username, "newuser123");
    assert_eq!(user.email, "newuser@gmail.com");
    assert!(user.is_oauth_only());

    // Exactly one account is bound to the OAuth email
    let found = service.user_by_email("newuser@gmail.com").await?.unwrap();
    assert_eq!(found.id, user.id);

    Ok(())
}

#[tokio::test]
async fn test_finalize_signup_rejects_taken_username() -> Result<()> {
    let (service, _temp) = test_service().await?;
    create_user(&service, "testuser").await?;

    let result = service
        .finalize_signup("testuser", "newuser@gmail.com")
        .await;
    let err = result.err().expect("taken username must be rejected");
    assert!(matches!(err, AppError::UsernameTaken(_)));
    assert_eq!(err.to_string(), "Username is already taken");

    // No user row was created for the OAuth email
    assert!(service.user_by_email("newuser@gmail.com").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_finalize_signup_rejects_known_email() -> Result<()> {
    let (service, _temp) = test_service().await?;
    // create_user registers with <username>@example.com
    create_user(&service, "testuser").await?;

    let result = service
        .finalize_signup("brandnew", "testuser@example.com")
        .await;
    assert!(matches!(result, Err(AppError::EmailTaken(_))));
    assert!(service.user_by_username("brandnew").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_finalize_signup_validates_username() -> Result<()> {
    let (service, _temp) = test_service().await?;

    for bad in ["", "   ", "has space"] {
        let result = service.finalize_signup(bad, "newuser@gmail.com").await;
        assert!(
            matches!(result, Err(AppError::InvalidUsername(_))),
            "username {bad:?} should be rejected"
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_register_rejects_duplicates() -> Result<()> {
    let (service, _temp) = test_service().await?;
    create_user(&service, "testuser").await?;

    let result = service
        .register_user("testuser", "other@example.com", "hash".to_string())
        .await;
    assert!(matches!(result, Err(AppError::UsernameTaken(_))));

    let result = service
        .register_user("other", "testuser@example.com", "hash".to_string())
        .await;
    assert!(matches!(result, Err(AppError::EmailTaken(_))));

    Ok(())
}

#[tokio::test]
async fn test_username_is_trimmed() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let user = service
        .finalize_signup("  padded  ", "padded@gmail.com")
        .await?;
    assert_eq!(user.username, "padded");

    Ok(())
}

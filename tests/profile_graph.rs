//! End-to-end flow over the HTTP surface: register users, build profiles,
//! declare charity support, read metrics. Runs against the in-memory store.

use serde_json::json;
use std::sync::Arc;
use wavehub::storage::document::DocumentStore;
use wavehub::{transport, MemoryStore};

async fn spawn_app() -> Result<(String, reqwest::Client), Box<dyn std::error::Error>> {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let app_state = transport::http::AppState::new(store);
    let router = transport::http::create_router(app_state);

    // Ephemeral port so parallel test binaries never collide.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Ok((format!("http://127.0.0.1:{}", port), reqwest::Client::new()))
}

async fn register(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    first_name: &str,
    role: &str,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let resp = client
        .post(format!("{}/api/users", base_url))
        .json(&json!({
            "email": email,
            "password": "hunter2!",
            "firstName": first_name,
            "lastName": "Tester",
            "role": role
        }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert!(resp["success"].as_bool().unwrap_or(false), "{:?}", resp);
    Ok(resp["data"].clone())
}

async fn create_profile(
    client: &reqwest::Client,
    base_url: &str,
    user_id: &str,
    email: &str,
    body: serde_json::Value,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let resp = client
        .post(format!("{}/api/profiles", base_url))
        .header("x-caller-id", user_id)
        .header("x-caller-email", email)
        .json(&body)
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert!(resp["success"].as_bool().unwrap_or(false), "{:?}", resp);
    Ok(resp["data"].clone())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn registration_and_profile_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let (base_url, client) = spawn_app().await?;

    // Register; the response never carries the password.
    let user = register(&client, &base_url, "Ada@Example.COM", "Ada", "person").await?;
    assert_eq!(user["email"], "ada@example.com");
    assert!(user.get("password").is_none());
    assert_eq!(user["isVerified"], false);
    let user_id = user["id"].as_str().unwrap().to_string();

    // Same email (case-insensitive) is a conflict.
    let dup = client
        .post(format!("{}/api/users", base_url))
        .json(&json!({
            "email": "ADA@example.com",
            "password": "x",
            "firstName": "Ada2",
            "lastName": "Lovelace"
        }))
        .send()
        .await?;
    assert_eq!(dup.status(), 409);

    // No profile yet.
    let fetched = client
        .get(format!("{}/api/users/{}", base_url, user_id))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(fetched["data"]["profileExists"], false);

    // Profile creation without caller identity is rejected.
    let anonymous = client
        .post(format!("{}/api/profiles", base_url))
        .json(&json!({ "name": "Nameless" }))
        .send()
        .await?;
    assert_eq!(anonymous.status(), 401);

    // Create a profile; the slug derives from the name with a uuid suffix.
    let profile = create_profile(
        &client,
        &base_url,
        &user_id,
        "ada@example.com",
        json!({ "name": "Ada & Co", "industry": "Research" }),
    )
    .await?;
    let slug = profile["slug"].as_str().unwrap();
    assert!(slug.starts_with("ada-and-co-"), "slug was {}", slug);
    let profile_id = profile["id"].as_str().unwrap().to_string();

    // One profile per owner.
    let second = client
        .post(format!("{}/api/profiles", base_url))
        .header("x-caller-id", &user_id)
        .json(&json!({ "name": "Shadow" }))
        .send()
        .await?;
    assert_eq!(second.status(), 409);

    // /me and /slug/:slug both resolve to the same profile.
    let me = client
        .get(format!("{}/api/profiles/me", base_url))
        .header("x-caller-id", &user_id)
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(me["data"]["id"], profile_id.as_str());
    let by_slug = client
        .get(format!("{}/api/profiles/slug/{}", base_url, slug))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(by_slug["data"]["id"], profile_id.as_str());

    // The user read now reports the profile.
    let fetched = client
        .get(format!("{}/api/users/{}", base_url, user_id))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(fetched["data"]["profileExists"], true);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn charity_support_entries_are_unique_and_reviewable() -> Result<(), Box<dyn std::error::Error>> {
    let (base_url, client) = spawn_app().await?;

    let supporter = register(&client, &base_url, "org@example.com", "Org", "company").await?;
    let supporter_id = supporter["id"].as_str().unwrap();
    let charity_user = register(&client, &base_url, "char@example.com", "Char", "charity").await?;
    let charity_user_id = charity_user["id"].as_str().unwrap();

    let supporter_profile = create_profile(
        &client,
        &base_url,
        supporter_id,
        "org@example.com",
        json!({ "name": "Org Inc" }),
    )
    .await?;
    let charity_profile = create_profile(
        &client,
        &base_url,
        charity_user_id,
        "char@example.com",
        json!({ "name": "Char Foundation" }),
    )
    .await?;
    let supporter_pid = supporter_profile["id"].as_str().unwrap();
    let charity_pid = charity_profile["id"].as_str().unwrap();

    // Charity directory lists only profiles owned by charity-role users.
    let charities = client
        .get(format!("{}/api/profiles/charities", base_url))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let listed = charities["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], charity_pid);

    // Declare support; starts pending.
    let declared = client
        .post(format!("{}/api/profiles/{}/charities", base_url, supporter_pid))
        .json(&json!({ "charityId": charity_pid }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(declared["data"]["charitiesSupported"][0]["status"], "pending");

    // Declaring it twice is a conflict.
    let dup = client
        .post(format!("{}/api/profiles/{}/charities", base_url, supporter_pid))
        .json(&json!({ "charityId": charity_pid }))
        .send()
        .await?;
    assert_eq!(dup.status(), 409);

    // The charity reviews the entry.
    let approved = client
        .patch(format!(
            "{}/api/profiles/{}/charities/{}",
            base_url, supporter_pid, charity_pid
        ))
        .json(&json!({ "status": "approved" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(approved["data"]["charitiesSupported"][0]["status"], "approved");

    // Removing an entry that is not there is a 404.
    let gone = client
        .delete(format!(
            "{}/api/profiles/{}/charities/{}",
            base_url, supporter_pid, "nonexistent"
        ))
        .send()
        .await?;
    assert_eq!(gone.status(), 404);

    let removed = client
        .delete(format!(
            "{}/api/profiles/{}/charities/{}",
            base_url, supporter_pid, charity_pid
        ))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(
        removed["data"]["charitiesSupported"].as_array().unwrap().len(),
        0
    );

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn verification_round_trip_rejects_unknown_tokens() -> Result<(), Box<dyn std::error::Error>> {
    let (base_url, client) = spawn_app().await?;

    let user = register(&client, &base_url, "v@example.com", "Vee", "person").await?;
    let user_id = user["id"].as_str().unwrap();

    // A made-up token does not verify anyone.
    let bogus = client
        .post(format!("{}/api/users/verify-email", base_url))
        .json(&json!({ "token": "not-a-real-token" }))
        .send()
        .await?;
    assert_eq!(bogus.status(), 404);

    // Re-issuing works while unverified.
    let reissued = client
        .post(format!("{}/api/users/{}/verification-token", base_url, user_id))
        .send()
        .await?;
    assert_eq!(reissued.status(), 200);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn search_and_listing_filters() -> Result<(), Box<dyn std::error::Error>> {
    let (base_url, client) = spawn_app().await?;

    for (i, (name, industry, location)) in [
        ("Green Makers", "Manufacturing", "Berlin"),
        ("Blue Ocean Lab", "Research", "Lisbon"),
        ("Green Research Hub", "Research", "Berlin"),
    ]
    .iter()
    .enumerate()
    {
        let user = register(
            &client,
            &base_url,
            &format!("u{}@example.com", i),
            "U",
            "company",
        )
        .await?;
        create_profile(
            &client,
            &base_url,
            user["id"].as_str().unwrap(),
            &format!("u{}@example.com", i),
            json!({ "name": name, "industry": industry, "location": location }),
        )
        .await?;
    }

    // Exact-match listing filters.
    let listed = client
        .get(format!(
            "{}/api/profiles?industry=Research&location=Berlin",
            base_url
        ))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(listed["data"]["total"], 1);
    assert_eq!(listed["data"]["data"][0]["name"], "Green Research Hub");

    // Case-insensitive substring search across text fields.
    let found = client
        .get(format!("{}/api/profiles/search?q=green", base_url))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(found["data"]["total"], 2);

    // Pagination clamps and reports totals.
    let page = client
        .get(format!("{}/api/profiles?page=2&limit=2", base_url))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(page["data"]["total"], 3);
    assert_eq!(page["data"]["data"].as_array().unwrap().len(), 1);
    assert_eq!(page["data"]["page"], 2);

    Ok(())
}

mod common;

use quillpost::application::auth::Identity;
use quillpost::application::posts::{
    CreatePostCommand, PostError, ReadAccess, UpdatePostCommand,
};
use quillpost::domain::slug::derive_slug;
use uuid::Uuid;

use common::{MemoryStore, post_service};

fn draft(title: &str) -> CreatePostCommand {
    CreatePostCommand {
        title: title.to_string(),
        content: "# Heading\n\nBody text.".to_string(),
        excerpt: None,
        published: None,
        tags: None,
        featured_image: None,
    }
}

fn published(title: &str) -> CreatePostCommand {
    CreatePostCommand {
        published: Some(true),
        ..draft(title)
    }
}

async fn author(store: &MemoryStore) -> Identity {
    let record = store.seed_author("Admin", "admin@example.com").await;
    Identity::from(&record)
}

#[tokio::test]
async fn create_derives_slug_and_defaults() {
    let store = MemoryStore::new();
    let service = post_service(&store);
    let author = author(&store).await;

    let post = service
        .create(&author, draft("Hello, World!"))
        .await
        .expect("create post");

    assert_eq!(post.slug, "hello-world");
    assert!(!post.published);
    assert!(post.tags.is_empty());
    assert_eq!(post.excerpt, None);
    assert_eq!(post.featured_image, None);
    assert_eq!(post.author_id, author.author_id);
}

#[tokio::test]
async fn create_normalises_tags_and_excerpt() {
    let store = MemoryStore::new();
    let service = post_service(&store);
    let author = author(&store).await;

    let post = service
        .create(
            &author,
            CreatePostCommand {
                excerpt: Some("   ".to_string()),
                tags: Some(vec![" rust ".into(), "".into(), "web".into()]),
                ..draft("Tagged")
            },
        )
        .await
        .expect("create post");

    assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
    assert_eq!(post.excerpt, None);
}

#[tokio::test]
async fn second_post_with_same_slug_conflicts() {
    let store = MemoryStore::new();
    let service = post_service(&store);
    let author = author(&store).await;

    service
        .create(&author, draft("Hello World"))
        .await
        .expect("first create");
    let err = service
        .create(&author, draft("hello, world!!"))
        .await
        .expect_err("duplicate slug");

    match err {
        PostError::Conflict { slug } => assert_eq!(slug, "hello-world"),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(store.post_count().await, 1);
}

#[tokio::test]
async fn invalid_featured_image_is_rejected_before_storage() {
    let store = MemoryStore::new();
    let service = post_service(&store);
    let author = author(&store).await;

    let err = service
        .create(
            &author,
            CreatePostCommand {
                featured_image: Some("javascript:alert(1)".to_string()),
                ..draft("Bad image")
            },
        )
        .await
        .expect_err("invalid image");

    assert!(matches!(err, PostError::Validation(_)));
    assert_eq!(store.post_count().await, 0);
}

#[tokio::test]
async fn published_listing_never_contains_drafts() {
    let store = MemoryStore::new();
    let service = post_service(&store);
    let author = author(&store).await;

    service.create(&author, published("One")).await.unwrap();
    service.create(&author, draft("Two")).await.unwrap();
    service.create(&author, published("Three")).await.unwrap();

    let visible = service
        .list(ReadAccess::IncludeDrafts, true)
        .await
        .expect("list");
    assert!(visible.iter().all(|post| post.post.published));
    let titles: Vec<_> = visible.iter().map(|post| post.post.title.as_str()).collect();
    assert_eq!(titles, vec!["Three", "One"]);

    let everything = service
        .list(ReadAccess::IncludeDrafts, false)
        .await
        .expect("list");
    assert_eq!(everything.len(), 3);
    assert_eq!(everything[0].author.name, "Admin");

    let anonymous = service
        .list(ReadAccess::PublishedOnly, false)
        .await
        .expect("list");
    assert_eq!(anonymous.len(), 2);
}

#[tokio::test]
async fn title_update_recomputes_slug() {
    let store = MemoryStore::new();
    let service = post_service(&store);
    let author = author(&store).await;

    let post = service.create(&author, draft("Old Title")).await.unwrap();
    let updated = service
        .update(
            &author,
            post.id,
            UpdatePostCommand {
                title: Some("New Title".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.slug, derive_slug("New Title"));
    assert_eq!(updated.slug, "new-title");
    assert_eq!(updated.content, post.content);
}

#[tokio::test]
async fn update_without_title_keeps_slug_and_can_clear_fields() {
    let store = MemoryStore::new();
    let service = post_service(&store);
    let author = author(&store).await;

    let post = service
        .create(
            &author,
            CreatePostCommand {
                excerpt: Some("Teaser".into()),
                featured_image: Some("/img/cover.png".into()),
                ..draft("Stable")
            },
        )
        .await
        .unwrap();

    let updated = service
        .update(
            &author,
            post.id,
            UpdatePostCommand {
                excerpt: Some(None),
                featured_image: Some(None),
                published: Some(true),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.slug, "stable");
    assert_eq!(updated.excerpt, None);
    assert_eq!(updated.featured_image, None);
    assert!(updated.published);
}

#[tokio::test]
async fn renaming_onto_existing_slug_conflicts() {
    let store = MemoryStore::new();
    let service = post_service(&store);
    let author = author(&store).await;

    service.create(&author, draft("Taken")).await.unwrap();
    let other = service.create(&author, draft("Free")).await.unwrap();

    let err = service
        .update(
            &author,
            other.id,
            UpdatePostCommand {
                title: Some("TAKEN".into()),
                ..Default::default()
            },
        )
        .await
        .expect_err("conflict");
    assert!(matches!(err, PostError::Conflict { .. }));
    assert_eq!(store.stored_post(other.id).await.unwrap().slug, "free");
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let store = MemoryStore::new();
    let service = post_service(&store);
    let author = author(&store).await;
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.delete(&author, missing).await,
        Err(PostError::NotFound)
    ));
    assert!(matches!(
        service
            .update(&author, missing, UpdatePostCommand::default())
            .await,
        Err(PostError::NotFound)
    ));
    assert!(matches!(
        service.get(missing, ReadAccess::IncludeDrafts).await,
        Err(PostError::NotFound)
    ));
}

#[tokio::test]
async fn delete_removes_the_post() {
    let store = MemoryStore::new();
    let service = post_service(&store);
    let author = author(&store).await;

    let post = service.create(&author, draft("Short lived")).await.unwrap();
    service.delete(&author, post.id).await.expect("delete");
    assert_eq!(store.post_count().await, 0);
    assert!(matches!(
        service.delete(&author, post.id).await,
        Err(PostError::NotFound)
    ));
}

#[tokio::test]
async fn unpublished_posts_hidden_from_published_reads() {
    let store = MemoryStore::new();
    let service = post_service(&store);
    let author = author(&store).await;

    let post = service.create(&author, draft("Secret")).await.unwrap();

    assert!(matches!(
        service.get_by_slug("secret", true).await,
        Err(PostError::NotFound)
    ));
    assert!(service.get_by_slug("secret", false).await.is_ok());
    assert!(matches!(
        service.get(post.id, ReadAccess::PublishedOnly).await,
        Err(PostError::NotFound)
    ));
    assert!(service.get(post.id, ReadAccess::IncludeDrafts).await.is_ok());
}

#[tokio::test]
async fn display_rendering_sanitises_markdown() {
    let store = MemoryStore::new();
    let service = post_service(&store);
    let author = author(&store).await;

    service
        .create(
            &author,
            CreatePostCommand {
                content: "**bold**\n\n<script>alert(1)</script>".into(),
                ..published("Rendered")
            },
        )
        .await
        .unwrap();

    let rendered = service
        .render_for_display("rendered")
        .await
        .expect("render");
    assert!(rendered.content_html.contains("<strong>bold</strong>"));
    assert!(!rendered.content_html.contains("<script"));
    assert_eq!(rendered.post.author.name, "Admin");
}

mod common;

use std::sync::Arc;

use mountain::{
    error::AppError,
    pagination::PageQuery,
    services::{
        ArticleInput, ArticleListQuery, ArticleService, ColumnInput, ColumnService, MpUserInput,
        MpUserService,
    },
};

use common::{FakeSessions, bare_db};

fn column(name: &str, sort_order: i32) -> ColumnInput {
    ColumnInput {
        name: name.to_string(),
        description: format!("{name} articles"),
        sort_order,
    }
}

fn article(column_id: i32, title: &str, status: Option<i32>) -> ArticleInput {
    ArticleInput {
        column_id,
        title: title.to_string(),
        thumbnail: String::new(),
        content: format!("<p>{title}</p>"),
        author: "staff".into(),
        status,
    }
}

#[tokio::test]
async fn columns_are_ordered_and_guarded_by_articles() {
    let db = bare_db().await;
    let columns = ColumnService::new(db.clone());
    let articles = ArticleService::new(db.clone());

    let news = columns.create(column("news", 2)).await.unwrap();
    let guides = columns.create(column("guides", 1)).await.unwrap();

    let listed: Vec<i32> = columns.list().await.unwrap().iter().map(|c| c.id).collect();
    assert_eq!(listed, vec![guides.id, news.id]);
    assert_eq!(columns.list_summaries().await.unwrap()[0].name, "guides");

    articles.create(article(news.id, "Launch", None)).await.unwrap();
    assert!(matches!(columns.delete(news.id).await, Err(AppError::Conflict(_))));

    columns.delete(guides.id).await.unwrap();
    assert!(matches!(columns.get(guides.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(
        columns.create(column(" ", 0)).await,
        Err(AppError::BadInput(_))
    ));
}

#[tokio::test]
async fn only_published_articles_reach_the_mini_program() {
    let db = bare_db().await;
    let columns = ColumnService::new(db.clone());
    let articles = ArticleService::new(db.clone());

    let news = columns.create(column("news", 1)).await.unwrap();
    let draft = articles.create(article(news.id, "Draft", None)).await.unwrap();
    let live = articles.create(article(news.id, "Live", Some(1))).await.unwrap();
    assert_eq!(draft.status, 0);

    let page = articles.list_published(news.id, PageQuery::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.page_size, 10);
    assert_eq!(page.list[0].id, live.id);

    assert!(matches!(
        articles.read_published(draft.id).await,
        Err(AppError::NotFound(_))
    ));

    articles.read_published(live.id).await.unwrap();
    let second = articles.read_published(live.id).await.unwrap();
    assert_eq!(second.article.view_count, 2);
    assert_eq!(second.column_name.as_deref(), Some("news"));

    articles.set_status(draft.id, 1).await.unwrap();
    let page = articles.list_published(news.id, PageQuery::default()).await.unwrap();
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn admin_article_list_filters_and_validates() {
    let db = bare_db().await;
    let columns = ColumnService::new(db.clone());
    let articles = ArticleService::new(db.clone());

    let news = columns.create(column("news", 1)).await.unwrap();
    let blog = columns.create(column("blog", 2)).await.unwrap();
    articles.create(article(news.id, "A", Some(1))).await.unwrap();
    articles.create(article(news.id, "B", None)).await.unwrap();
    let newest = articles.create(article(blog.id, "C", Some(1))).await.unwrap();

    let all = articles.list(ArticleListQuery::default()).await.unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.list[0].article.id, newest.id);
    assert_eq!(all.list[0].column_name.as_deref(), Some("blog"));

    let published_news = articles
        .list(ArticleListQuery {
            column_id: Some(news.id),
            status: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(published_news.total, 1);
    assert_eq!(published_news.list[0].article.title, "A");

    assert!(matches!(
        articles.create(article(news.id, "Bad", Some(5))).await,
        Err(AppError::BadInput(_))
    ));
    assert!(matches!(
        articles.create(article(999, "Orphan", None)).await,
        Err(AppError::BadInput(_))
    ));
    assert!(matches!(
        articles.set_status(newest.id, 2).await,
        Err(AppError::BadInput(_))
    ));

    articles.delete(newest.id).await.unwrap();
    assert!(matches!(articles.get(newest.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn wechat_login_finds_or_creates_by_openid() {
    let db = bare_db().await;
    let users = MpUserService::new(db.clone(), Arc::new(FakeSessions));

    let first = users.wechat_login("abc").await.unwrap();
    assert_eq!(first.open_id, "openid-abc");

    let again = users.wechat_login("abc").await.unwrap();
    assert_eq!(again.id, first.id);

    let other = users.wechat_login("xyz").await.unwrap();
    assert_ne!(other.id, first.id);
    assert_eq!(users.list(PageQuery::default()).await.unwrap().total, 2);

    assert!(matches!(users.wechat_login("").await, Err(AppError::BadInput(_))));
}

#[tokio::test]
async fn mini_program_users_register_and_are_managed() {
    let db = bare_db().await;
    let users = MpUserService::new(db.clone(), Arc::new(FakeSessions));

    let registered = users
        .register(MpUserInput {
            phone: "13800000000".into(),
            openid: "wx-1".into(),
            name: "Lin".into(),
        })
        .await
        .unwrap();
    let json = serde_json::to_value(&registered).unwrap();
    assert_eq!(json["openid"], "wx-1");

    let updated = users
        .update(
            registered.id,
            MpUserInput {
                phone: "13900000000".into(),
                openid: "wx-1".into(),
                name: "Lin Q".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Lin Q");

    users.delete(registered.id).await.unwrap();
    assert!(matches!(users.get(registered.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(
        users
            .register(MpUserInput {
                phone: String::new(),
                openid: String::new(),
                name: String::new(),
            })
            .await,
        Err(AppError::BadInput(_))
    ));
}

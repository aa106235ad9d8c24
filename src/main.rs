use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use pulse_social::handlers;
use pulse_social::middleware::GatewayAuthMiddleware;
use pulse_social::repository::{
    CommentLikeRepository, CommentLikeStore, CommentRepository, CommentStore, IdentityStore,
    PostLikeRepository, PostLikeStore, PostRepository, PostStore, UserRepository,
};
use pulse_social::services::{CommentService, FeedService, LikeService, PostService};
use pulse_social::storage::{FsImageStore, ImageStore};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health_summary(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "pulse-social",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "pulse-social"
        })),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match pulse_social::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting pulse-social v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize database connection pool
    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to run database migrations: {e}"),
        )
    })?;

    tracing::info!("Connected to database, migrations applied");

    // Explicit constructor injection: every store is built once here and
    // handed to the services that need it.
    let posts: Arc<dyn PostStore> = Arc::new(PostRepository::new(pool.clone()));
    let users: Arc<dyn IdentityStore> = Arc::new(UserRepository::new(pool.clone()));
    let comments: Arc<dyn CommentStore> = Arc::new(CommentRepository::new(pool.clone()));
    let post_likes: Arc<dyn PostLikeStore> = Arc::new(PostLikeRepository::new(pool.clone()));
    let comment_likes: Arc<dyn CommentLikeStore> =
        Arc::new(CommentLikeRepository::new(pool.clone()));
    let images: Arc<dyn ImageStore> =
        Arc::new(FsImageStore::new(config.storage.public_root.clone()));

    let post_service = web::Data::new(PostService::new(posts.clone(), images.clone()));
    let comment_service = web::Data::new(CommentService::new(comments.clone(), posts.clone()));
    let like_service = web::Data::new(LikeService::new(
        posts.clone(),
        comments.clone(),
        post_likes.clone(),
        comment_likes.clone(),
    ));
    let feed_service = web::Data::new(FeedService::new(
        posts.clone(),
        users.clone(),
        comments.clone(),
        post_likes.clone(),
    ));

    let pool_data = web::Data::new(pool.clone());
    let allowed_origins = config.cors.allowed_origins.clone();
    let bind_address = format!("{}:{}", config.app.host, config.app.port);

    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(pool_data.clone())
            .app_data(post_service.clone())
            .app_data(comment_service.clone())
            .app_data(like_service.clone())
            .app_data(feed_service.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route(
                "/metrics",
                web::get().to(pulse_social::metrics::serve_metrics),
            )
            .route("/api/v1/health", web::get().to(health_summary))
            .service(
                web::scope("/api/v1")
                    .wrap(GatewayAuthMiddleware)
                    .service(
                        web::scope("/posts")
                            .service(
                                web::resource("")
                                    .route(web::post().to(handlers::create_post))
                                    .route(web::get().to(handlers::get_all_posts)),
                            )
                            .route("/my", web::get().to(handlers::get_my_posts))
                            .route("/user/{user_id}", web::get().to(handlers::get_user_posts))
                            .route(
                                "/{post_id}/content",
                                web::patch().to(handlers::edit_post_content),
                            )
                            .service(
                                web::resource("/{post_id}/images")
                                    .route(web::patch().to(handlers::add_post_images))
                                    .route(web::delete().to(handlers::delete_post_images)),
                            )
                            .service(
                                web::resource("/{post_id}/comments")
                                    .route(web::post().to(handlers::create_comment))
                                    .route(web::get().to(handlers::get_post_comments)),
                            )
                            .route(
                                "/{post_id}/likes/count",
                                web::get().to(handlers::get_post_likes_count),
                            )
                            .service(
                                web::resource("/{post_id}/likes")
                                    .route(web::post().to(handlers::toggle_post_like))
                                    .route(web::get().to(handlers::get_post_likes)),
                            )
                            .service(
                                web::resource("/{post_id}")
                                    .route(web::get().to(handlers::get_post))
                                    .route(web::delete().to(handlers::delete_post)),
                            ),
                    )
                    .service(
                        web::scope("/comments")
                            .service(
                                web::resource("/{comment_id}/replies")
                                    .route(web::post().to(handlers::create_reply))
                                    .route(web::get().to(handlers::get_comment_replies)),
                            )
                            .route(
                                "/{comment_id}/likes/count",
                                web::get().to(handlers::get_comment_likes_count),
                            )
                            .service(
                                web::resource("/{comment_id}/likes")
                                    .route(web::post().to(handlers::toggle_comment_like))
                                    .route(web::get().to(handlers::get_comment_likes)),
                            )
                            .service(
                                web::resource("/{comment_id}")
                                    .route(web::patch().to(handlers::edit_comment))
                                    .route(web::delete().to(handlers::delete_comment)),
                            ),
                    ),
            )
    })
    .bind(&bind_address)?
    .workers(4)
    .run()
    .await
}

use pagehaus::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Clone, Serialize, Table)]
#[table(name = "emp")]
pub struct Emp {
    #[pk(1)]
    pub id: String,
    pub name: String,
    pub child: i32,
    pub joindate: DateTime<Utc>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🚀 Pagehaus Demo\n");

    // Database setup
    let config = AppConfig {
        database: DatabaseConfig::new(
            "localhost".to_string(), // host
            5432,                    // port
            "pagehaus".to_string(),  // database
            "postgres".to_string(),  // username
            "password".to_string(),  // password
            1,                       // min_connections
            5,                       // max_connections
            30,                      // connection_timeout_seconds
            600,                     // idle_timeout_seconds
            3600,                    // max_lifetime_seconds
        ),
        paging: PagingConfig::new(2, true),
    };

    let pagehaus = Pagehaus::new(config).await?;
    pagehaus.health_check().await?;
    println!("✅ Database connected");

    sqlx::query("DROP TABLE IF EXISTS emp")
        .execute(pagehaus.pool())
        .await?;
    sqlx::query(
        "CREATE TABLE emp (id TEXT PRIMARY KEY, name TEXT NOT NULL, \
         child INTEGER NOT NULL, joindate TIMESTAMPTZ NOT NULL)",
    )
    .execute(pagehaus.pool())
    .await?;

    // Seed nine rows through the insert builder
    let update = pagehaus.update::<Emp>()?;
    for i in 1..=9 {
        let emp = Emp {
            id: format!("e{}", i),
            name: format!("name {}", i),
            child: i % 3,
            joindate: Utc::now(),
        };
        update.insert(pagehaus.executor(), &emp).await?;
    }
    println!("✅ Seeded 9 employees");

    // Page forward two rows at a time
    let mut select = pagehaus.select::<Emp>()?;
    let mut list = select.get(pagehaus.executor()).await?;
    let mut page = 1;
    loop {
        let rows = list.get_all::<Emp>().await?;
        if rows.is_empty() {
            break;
        }
        let ids: Vec<&str> = rows.iter().map(|e| e.id.as_str()).collect();
        println!("📄 page {}: {:?}", page, ids);

        let Some(cursor) = list.cursor() else { break };
        println!("   cursor: {}", cursor);
        list.get_next(pagehaus.executor(), &cursor.to_string()).await?;
        page += 1;
    }

    // Jump straight to the last page
    let mut select = pagehaus.select::<Emp>()?;
    let mut list = select.get(pagehaus.executor()).await?;
    list.close().await?;
    if let Some(cursor) = list.cursor() {
        match list.get_last(pagehaus.executor(), &cursor.to_string()).await {
            Ok(()) => {
                let rows = list.get_all::<Emp>().await?;
                println!("⏭️  last page: {:?}", rows.iter().map(|e| &e.id).collect::<Vec<_>>());
            }
            Err(QueryError::LastPage) => println!("⏭️  already on the last page"),
            Err(e) => return Err(e.into()),
        }
    }

    println!("\n🎉 Demo finished");
    Ok(())
}

//! Position a cursor on a row by primary key, step around it, then modify rows.
//!
//! Reads its configuration from `$PAGEHAUS_CONFIG` or `./pagehaus.toml` and
//! expects the `emp` table created by the `demo` example.

use pagehaus::prelude::*;

#[derive(Debug, Default, Table)]
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
    let pagehaus = Pagehaus::from_env().await?;
    let executor = pagehaus.executor();

    let mut select = pagehaus.select::<Emp>()?.with_filter("child", ">=", 1);

    let mut emp = Emp::default();
    let cursor = select
        .get_by_pk_with_cursor(executor, &mut emp, &[json!("e5")])
        .await?;
    println!("🔎 {} sits at offset {}", emp.id, cursor.offset());

    select.get_next(executor, &mut emp, &cursor.to_string()).await?;
    println!("➡️  next: {}", emp.id);

    if let Some(cursor) = select.cursor() {
        select
            .get_previous(executor, &mut emp, &cursor.to_string())
            .await?;
        println!("⬅️  back to: {}", emp.id);
    }

    println!("🔢 {} rows match", select.count(executor).await?);

    let mut update = pagehaus.update::<Emp>()?;
    update.set("name", "renamed")?;
    let changed = update.update_by_pk(executor, &[json!("e5")]).await?;
    println!("✏️  updated {} row(s)", changed);

    let removed = update
        .with_filter("child", "=", 0)
        .delete(executor)
        .await?;
    println!("🗑️  deleted {} row(s)", removed);

    Ok(())
}

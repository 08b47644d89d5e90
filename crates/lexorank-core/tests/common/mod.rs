#![allow(dead_code)]

use lexorank_core::{
    config::RankingConfig,
    guard::LockProvider,
    memory::{MemoryCollection, MemoryRecord},
    position::Direction,
    ranking::Ranking,
    schema::Schema,
};
use std::sync::Arc;

pub type Table = MemoryCollection<u64>;
pub type Row = MemoryRecord<u64>;

pub fn pages() -> Table {
    MemoryCollection::new("pages")
}

pub fn paragraphs() -> Table {
    MemoryCollection::new("paragraphs").with_group_column("page_id")
}

pub fn pages_schema() -> Schema {
    Schema::new("pages")
        .column("id")
        .column("rank")
        .column("other_ranking_field")
}

pub fn paragraphs_schema() -> Schema {
    Schema::new("paragraphs")
        .column("id")
        .column("rank")
        .association("page", "page_id")
}

pub fn register(
    schema: &Schema,
    config: RankingConfig<Row>,
    provider: Option<Arc<dyn LockProvider>>,
) -> Ranking<Table> {
    Ranking::register(schema, config, provider)
        .expect("valid ranking config")
        .expect("rank field is a column")
}

pub fn page_ranking() -> Ranking<Table> {
    register(&pages_schema(), RankingConfig::new(), None)
}

pub fn paragraph_ranking() -> Ranking<Table> {
    register(&paragraphs_schema(), RankingConfig::new().group_by("page"), None)
}

/// Insert `count` rows, then move each to its insertion index and save.
pub fn create_sample_docs(
    table: &Table,
    ranking: &Ranking<Table>,
    count: usize,
    group: Option<u64>,
) -> Vec<Row> {
    let mut docs: Vec<Row> = (0..count)
        .map(|_| {
            let row = match group {
                Some(group) => MemoryRecord::new().in_group(group),
                None => MemoryRecord::new(),
            };
            table.insert(row).expect("insert row")
        })
        .collect();

    for (index, doc) in docs.iter_mut().enumerate() {
        ranking
            .move_to_and_save(table, doc, index)
            .expect("initial placement");
    }

    docs
}

pub fn ids(rows: &[Row]) -> Vec<u64> {
    rows.iter().filter_map(Row::id).collect()
}

pub fn ranked_ids(ranking: &Ranking<Table>, table: &Table) -> Vec<u64> {
    ids(&ranking.ranked(table, Direction::Asc).expect("ranked read"))
}

pub fn ranked_ids_in(ranking: &Ranking<Table>, table: &Table, group: u64) -> Vec<u64> {
    ids(&ranking
        .ranked_in(table, Some(&group), Direction::Asc)
        .expect("ranked read"))
}

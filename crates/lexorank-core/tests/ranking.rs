mod common;

use common::*;
use lexorank_core::{
    collection::PersistRecord,
    config::RankingConfig,
    error::{InvalidConfigError, RankingError},
    memory::MemoryRecord,
    obs::{metrics_report, metrics_reset_all},
    position::Position,
    rank::{Rank, value_between},
    ranking::Ranking,
    schema::Schema,
};

#[test]
fn ranks_a_fresh_entry() {
    let table = pages();
    let ranking = page_ranking();

    let mut page = table.insert(MemoryRecord::new()).expect("insert");
    assert!(!ranking.has_rank(&table, &page));

    ranking
        .move_to_and_save(&table, &mut page, 0)
        .expect("move to top");

    let id = page.id().expect("stored row");
    let reloaded = table.get(id).expect("read").expect("row exists");
    assert!(ranking.has_rank(&table, &reloaded));
}

#[test]
fn ranks_multiple_entries() {
    let table = pages();
    let ranking = page_ranking();
    let mut docs = create_sample_docs(&table, &ranking, 3, None);
    let [p1, p2, p3] = [0, 1, 2].map(|i| docs[i].id().expect("stored"));

    assert_eq!(ranked_ids(&ranking, &table), [p1, p2, p3]);

    ranking
        .move_to_and_save(&table, &mut docs[0], 2)
        .expect("move p1 to 2");
    assert_eq!(ranked_ids(&ranking, &table), [p2, p3, p1]);

    ranking
        .move_to_and_save(&table, &mut docs[2], 0)
        .expect("move p3 to 0");
    assert_eq!(ranked_ids(&ranking, &table), [p3, p2, p1]);
}

#[test]
fn moves_to_top() {
    let table = pages();
    let ranking = page_ranking();
    let mut docs = create_sample_docs(&table, &ranking, 3, None);
    let expected = [docs[2].id(), docs[0].id(), docs[1].id()].map(Option::unwrap);

    ranking
        .move_to_top_and_save(&table, &mut docs[2])
        .expect("move to top");

    assert_eq!(ranked_ids(&ranking, &table), expected);
}

#[test]
fn moves_to_end() {
    let table = pages();
    let ranking = page_ranking();
    let mut docs = create_sample_docs(&table, &ranking, 3, None);
    let [p1, p2, p3] = [0, 1, 2].map(|i| docs[i].id().expect("stored"));

    ranking
        .move_to_end_and_save(&table, &mut docs[0])
        .expect("move p1 to end");
    assert_eq!(ranked_ids(&ranking, &table), [p2, p3, p1]);

    ranking
        .move_to_with(&table, &mut docs[1], Position::End, |page| table.save(page))
        .expect("move p2 to end and save in finalize");
    assert_eq!(ranked_ids(&ranking, &table), [p3, p1, p2]);
}

#[test]
fn position_past_the_end_clamps_to_end() {
    let table = pages();
    let ranking = page_ranking();
    let mut docs = create_sample_docs(&table, &ranking, 3, None);
    let [p1, p2, p3] = [0, 1, 2].map(|i| docs[i].id().expect("stored"));

    let rank = ranking
        .move_to_and_save(&table, &mut docs[0], 4)
        .expect("move p1 past the end");
    assert_eq!(ranked_ids(&ranking, &table), [p2, p3, p1]);

    // already last: the rank is kept
    let again = ranking
        .move_to_and_save(&table, &mut docs[0], 5)
        .expect("move p1 past the end again");
    assert_eq!(again, rank);
    assert_eq!(ranked_ids(&ranking, &table), [p2, p3, p1]);
}

#[test]
fn out_of_range_index_matches_end() {
    let by_index = pages();
    let by_end = pages();
    let ranking = page_ranking();
    create_sample_docs(&by_index, &ranking, 3, None);
    create_sample_docs(&by_end, &ranking, 3, None);

    let mut a = by_index.insert(MemoryRecord::new()).expect("insert");
    let mut b = by_end.insert(MemoryRecord::new()).expect("insert");

    let indexed = ranking.move_to(&by_index, &mut a, 3).expect("index 3");
    let ended = ranking.move_to_end(&by_end, &mut b).expect("end");

    assert_eq!(indexed, ended);
}

#[test]
fn repeating_a_move_to_the_current_slot_keeps_the_rank() {
    let table = pages();
    let ranking = page_ranking();
    let mut docs = create_sample_docs(&table, &ranking, 3, None);
    let before = ranked_ids(&ranking, &table);

    for (index, doc) in docs.iter_mut().enumerate() {
        let current = doc.rank("rank").cloned().expect("ranked");
        let rank = ranking.move_to(&table, doc, index).expect("same slot");
        assert_eq!(rank, current);
    }

    assert_eq!(ranked_ids(&ranking, &table), before);
}

#[test]
fn inserts_between_two_neighbors() {
    let table = pages();
    let ranking = page_ranking();
    let a = table
        .insert(MemoryRecord::new().with_rank("rank", "a"))
        .expect("a");
    let b = table
        .insert(MemoryRecord::new().with_rank("rank", "c"))
        .expect("c");

    let mut c = table.insert(MemoryRecord::new()).expect("insert");
    let rank = ranking
        .move_to_and_save(&table, &mut c, 1)
        .expect("insert between");

    assert_eq!(rank, "b");
    let expected = [a.id(), c.id(), b.id()].map(Option::unwrap);
    assert_eq!(ranked_ids(&ranking, &table), expected);
}

#[test]
fn second_move_to_top_sorts_before_the_first() {
    let table = pages();
    let ranking = page_ranking();

    let mut x = table.insert(MemoryRecord::new()).expect("x");
    let x_rank = ranking.move_to_and_save(&table, &mut x, 0).expect("x to top");
    assert_eq!(ranked_ids(&ranking, &table), [x.id().expect("stored")]);

    let mut y = table.insert(MemoryRecord::new()).expect("y");
    let y_rank = ranking.move_to_and_save(&table, &mut y, 0).expect("y to top");

    assert!(y_rank < x_rank);
}

#[test]
fn empty_collection_gives_the_same_rank_for_top_and_end() {
    let ranking = page_ranking();
    let (top, end) = (pages(), pages());
    let mut a = top.insert(MemoryRecord::new()).expect("insert");
    let mut b = end.insert(MemoryRecord::new()).expect("insert");

    let at_top = ranking.move_to_top(&top, &mut a).expect("top");
    let at_end = ranking.move_to_end(&end, &mut b).expect("end");

    assert_eq!(at_top, at_end);
    assert_eq!(at_top, Rank::from("U"));
}

#[test]
fn move_without_save_only_stages_the_rank() {
    let table = pages();
    let ranking = page_ranking();
    let mut page = table.insert(MemoryRecord::new()).expect("insert");

    let rank = ranking.move_to(&table, &mut page, 0).expect("move");

    assert_eq!(page.rank("rank"), Some(&rank));
    assert!(ranking.ranked(&table, Default::default()).expect("read").is_empty());
}

#[test]
fn custom_ranking_column() {
    let table = pages();
    let ranking = register(
        &pages_schema(),
        RankingConfig::new().field("other_ranking_field"),
        None,
    );
    let mut page = table.insert(MemoryRecord::new()).expect("insert");

    ranking
        .move_to_and_save(&table, &mut page, 0)
        .expect("move");

    assert!(page.rank("other_ranking_field").is_some());
    assert!(page.rank("rank").is_none());
}

#[test]
fn empty_field_is_rejected_at_registration() {
    let err = Ranking::<Table>::register(&pages_schema(), RankingConfig::new().field(""), None)
        .expect_err("empty field");

    assert_eq!(err, InvalidConfigError::MissingField);
    assert_eq!(err.to_string(), "the ranking field cannot be empty");
}

#[test]
fn unknown_rank_column_leaves_the_type_unranked() {
    metrics_reset_all();
    let schema = Schema::new("pages").column("id");

    let ranking = Ranking::<Table>::register(&schema, RankingConfig::new(), None)
        .expect("warning, not an error");

    assert!(ranking.is_none());
    assert_eq!(metrics_report().ops.config_warnings, 1);
}

#[test]
fn invalid_neighbor_rank_surfaces_both_bounds() {
    let table = pages();
    let ranking = page_ranking();
    table
        .insert(MemoryRecord::new().with_rank("rank", "0"))
        .expect("row ranked at the minimum");
    let mut page = table.insert(MemoryRecord::new()).expect("insert");

    let err = ranking
        .move_to_top(&table, &mut page)
        .expect_err("nothing sorts below \"0\"");

    let RankingError::InvalidRank(inner) = &err else {
        panic!("expected InvalidRank, got {err:?}");
    };
    assert_eq!(inner.before, None);
    assert_eq!(inner.after.as_deref(), Some("0"));
    assert!(err.to_string().contains("nil and \"0\""));
    assert!(page.rank("rank").is_none());
}

#[test]
fn boundary_pairs_from_the_generator() {
    assert_eq!(value_between(Some("0"), Some("1")).expect("room below \"1\""), "0U");
    assert!(value_between(None, Some("0")).is_err());
    assert!(value_between(Some("z"), None).is_err());
}

#[test]
fn metrics_count_generated_and_reused_ranks() {
    metrics_reset_all();
    let table = pages();
    let ranking = page_ranking();
    let mut docs = create_sample_docs(&table, &ranking, 2, None);

    ranking
        .move_to(&table, &mut docs[1], 1)
        .expect("same slot");

    let report = metrics_report();
    assert_eq!(report.ops.moves, 3);
    assert_eq!(report.ops.ranks_generated, 2);
    assert_eq!(report.ops.ranks_reused, 1);
    assert_eq!(report.collections[0].name, "pages");
}

use anyhow::Result;
use chrono::NaiveDate;

use crate::model::{CopyStatus, Creator, Id, PhysicalCopy, Tag, Work};
use crate::store::traits::Store;

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn creator(first_name: &str, family_name: &str, born: Option<NaiveDate>, died: Option<NaiveDate>) -> Creator {
    let mut creator = Creator::new(first_name.to_string(), family_name.to_string());
    creator.date_of_birth = born;
    creator.date_of_death = died;
    creator
}

fn work(title: &str, creator: &Creator, summary: &str, isbn: &str, tags: &[&Tag]) -> Work {
    Work::new(
        title.to_string(),
        creator.id.clone(),
        summary.to_string(),
        isbn.to_string(),
        tags.iter().map(|tag| tag.id.clone()).collect(),
    )
}

fn copy(work: &Work, imprint: &str, status: CopyStatus, due_back: Option<NaiveDate>) -> PhysicalCopy {
    PhysicalCopy::new(work.id.clone(), imprint.to_string(), status, due_back)
}

/// Loads a small demo catalog. Returns the ids of the created works.
pub async fn load_seed_data<S: Store>(store: &S) -> Result<Vec<Id>> {
    let rothfuss = creator("Patrick", "Rothfuss", date(1973, 6, 6), None);
    let bova = creator("Ben", "Bova", date(1932, 11, 8), date(2020, 11, 29));
    let asimov = creator("Isaac", "Asimov", date(1920, 1, 2), date(1992, 4, 6));
    let billings = creator("Bob", "Billings", None, None);
    let jones = creator("Jim", "Jones", date(1971, 12, 16), None);
    for record in [&rothfuss, &bova, &asimov, &billings, &jones] {
        store.put(record).await?;
    }

    let fantasy = Tag::new("Fantasy".to_string());
    let science_fiction = Tag::new("Science Fiction".to_string());
    let french_poetry = Tag::new("French Poetry".to_string());
    for record in [&fantasy, &science_fiction, &french_poetry] {
        store.put(record).await?;
    }

    let works = vec![
        work(
            "The Name of the Wind (The Kingkiller Chronicle, #1)",
            &rothfuss,
            "I have stolen princesses back from sleeping barrow kings.",
            "9781473211896",
            &[&fantasy],
        ),
        work(
            "The Wise Man's Fear (The Kingkiller Chronicle, #2)",
            &rothfuss,
            "Picking up the tale of Kvothe Kingkiller once again.",
            "9788401352836",
            &[&fantasy],
        ),
        work(
            "The Slow Regard of Silent Things (Kingkiller Chronicle)",
            &rothfuss,
            "Deep below the University, there is a dark place.",
            "9780756411336",
            &[&fantasy],
        ),
        work(
            "Apes and Angels",
            &bova,
            "Humankind headed out to the stars not for conquest but to save intelligent species.",
            "9780765379528",
            &[&science_fiction],
        ),
        work(
            "Death Wave",
            &bova,
            "In Ben Bova's previous novel a wave of deadly radiation was discovered.",
            "9780765379504",
            &[&science_fiction],
        ),
        work("Test Book 1", &asimov, "Summary of test book 1", "ISBN111111", &[&french_poetry, &science_fiction]),
        work("Test Book 2", &asimov, "Summary of test book 2", "ISBN222222", &[]),
    ];
    for record in &works {
        store.put(record).await?;
    }

    let copies = [
        copy(&works[0], "London Gollancz, 2014.", CopyStatus::Available, None),
        copy(&works[1], " Gollancz, 2011.", CopyStatus::Loaned, date(2026, 11, 1)),
        copy(&works[2], " Gollancz, 2015.", CopyStatus::Available, None),
        copy(&works[3], "New York Tom Doherty Associates, 2016.", CopyStatus::Available, None),
        copy(&works[3], "New York Tom Doherty Associates, 2016.", CopyStatus::Available, None),
        copy(&works[3], "New York Tom Doherty Associates, 2016.", CopyStatus::Available, None),
        copy(&works[4], "New York, NY Tom Doherty Associates, LLC, 2015.", CopyStatus::Available, None),
        copy(&works[4], "New York, NY Tom Doherty Associates, LLC, 2015.", CopyStatus::Maintenance, None),
        copy(&works[4], "New York, NY Tom Doherty Associates, LLC, 2015.", CopyStatus::Loaned, None),
        copy(&works[0], "Imprint XXX2", CopyStatus::Reserved, None),
        copy(&works[1], "Imprint XXX3", CopyStatus::Maintenance, None),
    ];
    for record in &copies {
        store.put(record).await?;
    }

    log::info!("Seeded demo catalog: {} works, {} copies", works.len(), copies.len());

    Ok(works.into_iter().map(|w| w.id).collect())
}

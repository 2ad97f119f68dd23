//! Class seeding and student placement.

use rayon::prelude::*;
use sqlx::PgPool;
use std::time::Instant;
use uuid::Uuid;

use super::models::ClassSeed;

const SUBJECTS: [&str; 10] = [
    "Data Structures",
    "Operating Systems",
    "Computer Networks",
    "Database Systems",
    "Linear Algebra",
    "Discrete Mathematics",
    "Compiler Design",
    "Digital Electronics",
    "Software Engineering",
    "Machine Learning",
];

/// Assigns teachers round-robin over `faculty_ids`.
pub fn generate_classes(count: usize, faculty_ids: &[Uuid]) -> Vec<ClassSeed> {
    if faculty_ids.is_empty() {
        return Vec::new();
    }

    (0..count)
        .into_par_iter()
        .map(|i| ClassSeed {
            name: format!("{} {}", SUBJECTS[i % SUBJECTS.len()], 101 + i),
            teacher_id: faculty_ids[i % faculty_ids.len()],
        })
        .collect()
}

/// Pairs each student with a class, round-robin.
pub fn placements(student_ids: &[Uuid], class_ids: &[Uuid]) -> Vec<(Uuid, Uuid)> {
    if class_ids.is_empty() {
        return Vec::new();
    }

    student_ids
        .par_iter()
        .enumerate()
        .map(|(i, &student_id)| (student_id, class_ids[i % class_ids.len()]))
        .collect()
}

pub async fn seed_classes(
    db: &PgPool,
    count: usize,
    faculty_ids: &[Uuid],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🏫 Seeding {} classes...", count);

    let classes = generate_classes(count, faculty_ids);
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(classes.len());

    for class in &classes {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO classes (name, teacher_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(&class.name)
        .bind(class.teacher_id)
        .fetch_one(&mut *tx)
        .await?;
        ids.push(id);
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} classes in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

/// Sets each student's class and records the enrollment.
pub async fn enroll_students(
    db: &PgPool,
    student_ids: &[Uuid],
    class_ids: &[Uuid],
) -> Result<usize, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let pairs = placements(student_ids, class_ids);
    println!("📝 Enrolling {} students...", pairs.len());

    let (students, classes): (Vec<Uuid>, Vec<Uuid>) = pairs.iter().copied().unzip();

    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        UPDATE students s SET class_id = p.class_id
        FROM UNNEST($1::uuid[], $2::uuid[]) AS p(student_id, class_id)
        WHERE s.id = p.student_id
        "#,
    )
    .bind(&students)
    .bind(&classes)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO class_enrollments (student_id, class_id)
        SELECT * FROM UNNEST($1::uuid[], $2::uuid[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(&students)
    .bind(&classes)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    println!("   ✓ Enrolled students in {:?}", start_time.elapsed());
    Ok(pairs.len())
}

/// Deletes classes taught by seeded faculty. Must run before the faculty rows
/// are removed, since deleting a teacher only nulls `teacher_id`.
pub async fn clear_classes(
    db: &PgPool,
    seed_email_pattern: &str,
) -> Result<u64, Box<dyn std::error::Error>> {
    let result = sqlx::query(
        "DELETE FROM classes WHERE teacher_id IN (SELECT id FROM faculty WHERE email LIKE $1)",
    )
    .bind(seed_email_pattern)
    .execute(db)
    .await?
    .rows_affected();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_rotate_through_faculty() {
        let faculty: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let classes = generate_classes(7, &faculty);
        assert_eq!(classes.len(), 7);
        assert_eq!(classes[0].teacher_id, faculty[0]);
        assert_eq!(classes[3].teacher_id, faculty[0]);
        assert_eq!(classes[5].teacher_id, faculty[2]);
    }

    #[test]
    fn test_no_faculty_means_no_classes() {
        assert!(generate_classes(5, &[]).is_empty());
        assert!(placements(&[Uuid::new_v4()], &[]).is_empty());
    }

    #[test]
    fn test_placements_cover_every_student() {
        let students: Vec<Uuid> = (0..10).map(|_| Uuid::new_v4()).collect();
        let classes: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let pairs = placements(&students, &classes);
        assert_eq!(pairs.len(), 10);
        assert_eq!(pairs[4], (students[4], classes[0]));
    }
}

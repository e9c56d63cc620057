//! Shared fixtures for integration tests.
#![allow(dead_code)]

use learnhub_core::model::curriculum::{
    ClassLevel, Content, ContentKind, ContentStatus, Curriculum, HierarchyNode, Subject,
    Subtopic, Topic,
};
use learnhub_core::model::quiz::{Difficulty, Question, QuestionKind};
use learnhub_core::model::user::{User, UserRole};
use learnhub_core::InMemoryRemote;

pub const CLASS_ID: &str = "grade-7";
pub const SUBJECT_ID: &str = "math-7";
pub const TOPIC_ID: &str = "fractions";
pub const SUBTOPIC_A: &str = "fractions-intro";
pub const SUBTOPIC_B: &str = "fractions-add";

pub fn class(id: &str, order: i64) -> ClassLevel {
    ClassLevel {
        id: id.to_string(),
        name: format!("Class {id}"),
        curriculum: Curriculum::Cbc,
        description: String::new(),
        order,
    }
}

pub fn subject(id: &str, class_id: &str, name: &str) -> Subject {
    Subject {
        id: id.to_string(),
        class_id: class_id.to_string(),
        name: name.to_string(),
        description: String::new(),
        icon: None,
    }
}

pub fn topic(id: &str, subject_id: &str, order: i64) -> Topic {
    Topic {
        id: id.to_string(),
        subject_id: subject_id.to_string(),
        name: format!("Topic {id}"),
        description: String::new(),
        order,
    }
}

pub fn subtopic(id: &str, topic_id: &str, order: i64) -> Subtopic {
    Subtopic {
        id: id.to_string(),
        topic_id: topic_id.to_string(),
        name: format!("Subtopic {id}"),
        description: String::new(),
        order,
    }
}

pub fn content(id: &str, subtopic_id: &str, status: ContentStatus, order: i64) -> Content {
    Content {
        id: id.to_string(),
        subtopic_id: subtopic_id.to_string(),
        title: format!("Lesson {id}"),
        kind: ContentKind::Text,
        body: "Read carefully.".to_string(),
        media_url: None,
        duration_minutes: Some(10),
        status,
        order,
    }
}

/// One class, subject and topic with two subtopics.
///
/// `fractions-intro` holds two published items and one draft;
/// `fractions-add` holds one published item.
pub fn seeded_remote() -> InMemoryRemote {
    let remote = InMemoryRemote::new();
    remote.seed(HierarchyNode::Class(class(CLASS_ID, 7)));
    remote.seed(HierarchyNode::Subject(subject(SUBJECT_ID, CLASS_ID, "Mathematics")));
    remote.seed(HierarchyNode::Topic(topic(TOPIC_ID, SUBJECT_ID, 1)));
    remote.seed(HierarchyNode::Subtopic(subtopic(SUBTOPIC_A, TOPIC_ID, 1)));
    remote.seed(HierarchyNode::Subtopic(subtopic(SUBTOPIC_B, TOPIC_ID, 2)));
    remote.seed(HierarchyNode::Content(content(
        "intro-1",
        SUBTOPIC_A,
        ContentStatus::Published,
        1,
    )));
    remote.seed(HierarchyNode::Content(content(
        "intro-2",
        SUBTOPIC_A,
        ContentStatus::Published,
        2,
    )));
    remote.seed(HierarchyNode::Content(content(
        "intro-draft",
        SUBTOPIC_A,
        ContentStatus::Draft,
        3,
    )));
    remote.seed(HierarchyNode::Content(content(
        "add-1",
        SUBTOPIC_B,
        ContentStatus::Published,
        1,
    )));
    remote
}

pub fn user(id: &str, role: UserRole) -> User {
    User {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@example.co.ke"),
        role,
        school: Some("Moi Avenue Primary".to_string()),
        class_id: Some(CLASS_ID.to_string()),
    }
}

pub fn question(id: &str, topic_id: &str, difficulty: Difficulty, marks: u32) -> Question {
    Question {
        id: id.to_string(),
        subject_id: SUBJECT_ID.to_string(),
        topic_id: Some(topic_id.to_string()),
        text: format!("What is the answer to {id}?"),
        kind: QuestionKind::MultipleChoice,
        options: vec!["1/2".to_string(), "1/4".to_string(), format!("{id}-answer")],
        correct_answer: format!("{id}-answer"),
        explanation: None,
        difficulty,
        marks,
    }
}

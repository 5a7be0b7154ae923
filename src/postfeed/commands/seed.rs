use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Language, NewPost, PostType};
use crate::store::DocumentStore;

/// The sample corpus inserted by `seed`: three questions and two articles.
pub fn sample_posts() -> Vec<NewPost> {
    vec![
        NewPost::new(
            PostType::Question,
            "How to handle async/await in React hooks?",
            "I am trying to use async/await with useEffect but getting warnings. What is the best \
             practice for handling asynchronous operations in React hooks?",
        )
        .with_code(
            "useEffect(() => {\n  const fetchData = async () => {\n    try {\n      const response = await fetch('/api/data');\n      const data = await response.json();\n      setData(data);\n    } catch (error) {\n      console.error('Error:', error);\n    }\n  };\n\n  fetchData();\n}, []);",
            Language::Javascript,
        )
        .with_tags(["react", "javascript", "async-await", "hooks"])
        .with_author("React Developer"),
        NewPost::new(
            PostType::Article,
            "Understanding Firestore Security Rules",
            "A comprehensive guide to setting up and understanding document store security \
             rules to protect your data.",
        )
        .with_abstract(
            "Learn how to write effective security rules that protect your data while allowing \
             legitimate access.",
        )
        .with_tags(["firebase", "firestore", "security", "database"])
        .with_author("Firebase Expert"),
        NewPost::new(
            PostType::Question,
            "Python list comprehension vs map() function",
            "When should I use list comprehension versus the map() function in Python? What are \
             the performance differences?",
        )
        .with_code(
            "# List comprehension\nnumbers = [1, 2, 3, 4, 5]\nsquared_lc = [x**2 for x in numbers]\n\n# Using map()\nsquared_map = list(map(lambda x: x**2, numbers))\n\nprint(\"List comprehension:\", squared_lc)\nprint(\"Map function:\", squared_map)",
            Language::Python,
        )
        .with_tags(["python", "list-comprehension", "map", "performance"])
        .with_author("Python Enthusiast"),
        NewPost::new(
            PostType::Article,
            "Modern CSS Grid Layout Techniques",
            "Explore advanced CSS Grid techniques for creating responsive and flexible layouts in \
             modern web applications.",
        )
        .with_abstract(
            "Master CSS Grid with practical examples and learn how to create complex layouts with \
             minimal code.",
        )
        .with_code(
            ".grid-container {\n  display: grid;\n  grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));\n  grid-gap: 20px;\n  padding: 20px;\n}\n\n.grid-item {\n  background: #f0f0f0;\n  padding: 20px;\n  border-radius: 8px;\n  box-shadow: 0 2px 4px rgba(0,0,0,0.1);\n}",
            Language::Css,
        )
        .with_tags(["css", "grid", "layout", "responsive-design"])
        .with_author("CSS Specialist"),
        NewPost::new(
            PostType::Question,
            "Best practices for REST API design",
            "What are the current best practices for designing RESTful APIs? Should I use PUT or \
             PATCH for updates?",
        )
        .with_tags(["api", "rest", "backend", "web-development"])
        .with_author("Backend Developer"),
    ]
}

/// Inserts the sample corpus in order. Stops at the first failed insert.
pub fn run<S: DocumentStore + ?Sized>(store: &mut S, collection: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for draft in sample_posts() {
        let post = store.create_post(collection, draft)?;
        result.add_message(CmdMessage::success(format!(
            "Document written with ID: {}",
            post.id
        )));
        result.affected_posts.push(post);
    }

    log::info!("seeded {} posts into '{}'", result.affected_posts.len(), collection);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use crate::store::DEFAULT_COLLECTION;

    #[test]
    fn corpus_has_three_questions_and_two_articles() {
        let posts = sample_posts();
        let questions = posts
            .iter()
            .filter(|p| p.post_type == PostType::Question)
            .count();
        assert_eq!(posts.len(), 5);
        assert_eq!(questions, 3);
        assert!(posts
            .iter()
            .filter(|p| p.post_type == PostType::Question)
            .all(|p| p.abstract_text.is_none()));
    }

    #[test]
    fn inserts_every_sample() {
        let mut store = InMemoryStore::new();
        let result = run(&mut store, DEFAULT_COLLECTION).unwrap();

        assert_eq!(result.affected_posts.len(), 5);
        assert_eq!(result.messages.len(), 5);

        // Inserted in order, so the last sample is the newest.
        let stored = store.posts(DEFAULT_COLLECTION);
        assert_eq!(stored.len(), 5);
        assert_eq!(stored[0].title, "Best practices for REST API design");
    }
}

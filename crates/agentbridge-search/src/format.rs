//! Plain-text rendering of search results for the agent.

use crate::youtube::VideoResult;

/// Header line, then one numbered block per video in the given order.
pub fn format_results(query: &str, videos: &[VideoResult]) -> String {
    let mut text = format!(
        "Here are {} YouTube videos related to '{}':\n\n",
        videos.len(),
        query
    );
    for (i, video) in videos.iter().enumerate() {
        text.push_str(&format!("{}. {}\n   {}\n\n", i + 1, video.title, video.url));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(title: &str, url: &str) -> VideoResult {
        VideoResult {
            title: title.into(),
            description: String::new(),
            thumbnail_url: String::new(),
            video_id: String::new(),
            url: url.into(),
        }
    }

    #[test]
    fn test_two_videos() {
        let text = format_results("rust", &[video("A", "u1"), video("B", "u2")]);
        assert_eq!(
            text,
            "Here are 2 YouTube videos related to 'rust':\n\n1. A\n   u1\n\n2. B\n   u2\n\n"
        );
    }

    #[test]
    fn test_no_videos() {
        assert_eq!(
            format_results("nothing", &[]),
            "Here are 0 YouTube videos related to 'nothing':\n\n"
        );
    }
}

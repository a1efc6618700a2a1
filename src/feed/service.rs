use crate::feed::model::FeedItem;
use crate::job::model::JobView;
use crate::job::service::JobService;
use crate::post::post_model::PostView;
use crate::post::post_service::PostService;
use crate::utils::error::CustomError;
use crate::utils::model::OwnerRef;

/// Interleave posts and jobs newest first, then cut the requested page.
///
/// Both inputs must already be sorted newest first; on equal timestamps posts go first.
pub fn merge_timeline(posts: Vec<PostView>, jobs: Vec<JobView>, skip: usize, limit: usize) -> Vec<FeedItem> {
    let mut posts = posts.into_iter().peekable();
    let mut jobs = jobs.into_iter().peekable();
    let end = skip.saturating_add(limit);
    let mut merged = Vec::new();

    while merged.len() < end {
        let take_post = match (posts.peek(), jobs.peek()) {
            (Some(post), Some(job)) => post.created_at >= job.created_at,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let item = if take_post {
            posts.next().map(FeedItem::Post)
        } else {
            jobs.next().map(FeedItem::Job)
        };
        merged.extend(item);
    }

    merged.into_iter().skip(skip).collect()
}

pub async fn timeline(
    post_service: &PostService,
    job_service: &JobService,
    viewer: &OwnerRef,
    skip: u64,
    limit: u64,
) -> Result<Vec<FeedItem>, CustomError> {
    // Any page of the merge draws at most skip + limit items from each source
    let window = skip
        .checked_add(limit)
        .ok_or_else(|| CustomError::BadRequestError("Page out of range".to_string()))?;

    let posts = post_service.recent_posts(window).await?;
    let post_views = post_service.to_views(&posts, viewer).await?;
    let job_views: Vec<JobView> = job_service
        .recent_open_jobs(window)
        .await?
        .iter()
        .map(JobView::from)
        .collect();

    Ok(merge_timeline(post_views, job_views, skip as usize, limit as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::model::EmploymentType;
    use crate::reaction::model::empty_counts;
    use crate::utils::model::{OwnerKind, OwnerView};
    use chrono::{DateTime, Duration, Utc};

    fn post(id: &str, at: DateTime<Utc>) -> PostView {
        PostView {
            id: id.into(),
            author: OwnerView { kind: OwnerKind::User, id: "u".into(), name: None },
            content: Some(id.into()),
            media_url: None,
            reactions: Vec::new(),
            reactions_count: empty_counts(),
            current_reaction: None,
            comments_count: 0,
            shares_count: 0,
            is_highlighted: false,
            created_at: at,
            updated_at: at,
        }
    }

    fn job(id: &str, at: DateTime<Utc>) -> JobView {
        JobView {
            id: id.into(),
            company_id: "c".into(),
            title: id.into(),
            description: "d".into(),
            location: None,
            employment_type: EmploymentType::FullTime,
            remote: true,
            salary_min: None,
            salary_max: None,
            is_open: true,
            created_at: at,
            updated_at: at,
        }
    }

    fn ids(items: &[FeedItem]) -> Vec<String> {
        items
            .iter()
            .map(|item| match item {
                FeedItem::Post(p) => p.id.clone(),
                FeedItem::Job(j) => j.id.clone(),
            })
            .collect()
    }

    #[test]
    fn interleaves_newest_first() {
        let now = Utc::now();
        let posts = vec![post("p1", now), post("p2", now - Duration::hours(2))];
        let jobs = vec![job("j1", now - Duration::hours(1)), job("j2", now - Duration::hours(3))];

        let merged = merge_timeline(posts, jobs, 0, 10);
        assert_eq!(ids(&merged), vec!["p1", "j1", "p2", "j2"]);
    }

    #[test]
    fn pages_are_cut_after_merging() {
        let now = Utc::now();
        let posts = vec![post("p1", now), post("p2", now - Duration::hours(2))];
        let jobs = vec![job("j1", now - Duration::hours(1)), job("j2", now - Duration::hours(3))];

        let merged = merge_timeline(posts, jobs, 1, 2);
        assert_eq!(ids(&merged), vec!["j1", "p2"]);
    }

    #[test]
    fn far_pages_are_empty_without_allocating() {
        let now = Utc::now();
        let merged = merge_timeline(vec![post("p1", now)], vec![job("j1", now)], 3_602_879_701_896_396_800, 100);
        assert!(merged.is_empty());

        let merged = merge_timeline(Vec::new(), Vec::new(), usize::MAX, 100);
        assert!(merged.is_empty());
    }

    #[test]
    fn ties_prefer_posts_and_tag_serializes() {
        let now = Utc::now();
        let merged = merge_timeline(vec![post("p", now)], vec![job("j", now)], 0, 5);
        assert_eq!(ids(&merged), vec!["p", "j"]);

        let value = serde_json::to_value(&merged[1]).unwrap();
        assert_eq!(value["kind"], "job");
        assert_eq!(value["title"], "j");
        let back: FeedItem = serde_json::from_value(value).unwrap();
        assert_eq!(back, merged[1]);
    }
}

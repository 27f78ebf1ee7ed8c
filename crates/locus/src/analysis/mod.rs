//! Fixed battery of questions answered over the collected tables.
//!
//! [`Report::build`] answers all sixteen at once. Statistics that are not
//! defined for the data at hand (no samples, zero variance, an empty group)
//! are `None` and print as `n/a`.

mod stats;

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Datelike, TimeZone, Utc, Weekday};
use serde::Serialize;

use crate::record::{RepositoryRecord, UserRecord};

pub use stats::{
    mean, modes, most_common_alphabetical, most_common_first_seen, ols_slope, pearson, tally,
};

const TOP_N: usize = 5;
const TOP_LICENSES: usize = 3;

/// Answers to the sixteen questions, in question order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Q1. Logins with the most followers.
    pub top_followed: Vec<String>,
    /// Q2. Logins with the earliest account creation.
    pub earliest_registered: Vec<String>,
    /// Q3. Most common repository licenses.
    pub top_licenses: Vec<String>,
    /// Q4. Most common company.
    pub top_company: Option<String>,
    /// Q5. Most common repository language.
    pub top_language: Option<String>,
    /// Q6. Second most common language among users who joined after 2020-01-01.
    pub second_language_recent_users: Option<String>,
    /// Q7. Language with the highest mean star count per repository.
    pub top_language_by_stars: Option<String>,
    /// Q8. Logins with the highest `followers / (1 + following)`.
    pub top_leader_strength: Vec<String>,
    /// Q9.
    pub followers_repos_correlation: Option<f64>,
    /// Q10. Followers gained per public repository.
    pub followers_repos_slope: Option<f64>,
    /// Q11.
    pub projects_wiki_correlation: Option<f64>,
    /// Q12. Mean following of hireable users minus that of the rest.
    pub hireable_following_difference: Option<f64>,
    /// Q13. Followers gained per word of bio, among users with a bio.
    pub bio_words_slope: Option<f64>,
    /// Q14. Logins with the most repositories created on a Saturday or Sunday.
    pub top_weekend_creators: Vec<String>,
    /// Q15. Share of hireable users with a public email minus that of the rest.
    pub hireable_email_share_difference: Option<f64>,
    /// Q16. Most common surname(s), sorted alphabetically on a tie.
    pub common_surnames: Vec<String>,
}

impl Report {
    pub fn build(users: &[UserRecord], repos: &[RepositoryRecord]) -> Self {
        let followers: Vec<f64> = users.iter().map(|u| u.followers as f64).collect();
        let public_repos: Vec<f64> = users.iter().map(|u| u.public_repos as f64).collect();

        Self {
            top_followed: top_logins(users, TOP_N, |u| u.followers as f64),
            earliest_registered: earliest_registered(users, TOP_N),
            top_licenses: owned(
                most_common_first_seen(
                    repos
                        .iter()
                        .map(|r| r.license_name.as_str())
                        .filter(|l| !l.is_empty()),
                )
                .into_iter()
                .take(TOP_LICENSES),
            ),
            top_company: most_common_alphabetical(
                users
                    .iter()
                    .map(|u| u.company.as_str())
                    .filter(|c| !c.is_empty()),
            )
            .first()
            .map(|c| c.to_string()),
            top_language: most_common_first_seen(languages(repos.iter()))
                .first()
                .map(|l| l.to_string()),
            second_language_recent_users: second_language_recent_users(users, repos),
            top_language_by_stars: top_language_by_stars(repos),
            top_leader_strength: top_logins(users, TOP_N, |u| {
                u.followers as f64 / (1.0 + u.following as f64)
            }),
            followers_repos_correlation: pearson(&followers, &public_repos),
            followers_repos_slope: ols_slope(&public_repos, &followers),
            projects_wiki_correlation: projects_wiki_correlation(repos),
            hireable_following_difference: hireable_difference(users, |u| u.following as f64),
            bio_words_slope: bio_words_slope(users),
            top_weekend_creators: owned(
                most_common_first_seen(
                    repos
                        .iter()
                        .filter(|r| r.created_at.is_some_and(is_weekend))
                        .map(|r| r.login.as_str()),
                )
                .into_iter()
                .take(TOP_N),
            ),
            hireable_email_share_difference: hireable_difference(users, |u| {
                if u.email.is_some() { 1.0 } else { 0.0 }
            }),
            common_surnames: owned(modes(users.iter().filter_map(surname))),
        }
    }
}

fn owned<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    keys.into_iter().map(String::from).collect()
}

fn languages<'a>(repos: impl Iterator<Item = &'a RepositoryRecord>) -> impl Iterator<Item = &'a str> {
    repos.filter_map(|r| r.language.as_deref())
}

/// Top `n` logins by `score`, highest first; equal scores keep table order.
fn top_logins<F>(users: &[UserRecord], n: usize, score: F) -> Vec<String>
where
    F: Fn(&UserRecord) -> f64,
{
    let mut ranked: Vec<(&UserRecord, f64)> = users.iter().map(|u| (u, score(u))).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
        .into_iter()
        .take(n)
        .map(|(u, _)| u.login.clone())
        .collect()
}

fn earliest_registered(users: &[UserRecord], n: usize) -> Vec<String> {
    let mut dated: Vec<(&UserRecord, DateTime<Utc>)> = users
        .iter()
        .filter_map(|u| u.created_at.map(|ts| (u, ts)))
        .collect();
    dated.sort_by_key(|(_, ts)| *ts);
    dated
        .into_iter()
        .take(n)
        .map(|(u, _)| u.login.clone())
        .collect()
}

fn recent_signup_cutoff() -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single()
}

fn second_language_recent_users(
    users: &[UserRecord],
    repos: &[RepositoryRecord],
) -> Option<String> {
    let cutoff = recent_signup_cutoff()?;
    let recent: HashSet<&str> = users
        .iter()
        .filter(|u| u.created_at.is_some_and(|ts| ts > cutoff))
        .map(|u| u.login.as_str())
        .collect();

    most_common_first_seen(languages(
        repos.iter().filter(|r| recent.contains(r.login.as_str())),
    ))
    .get(1)
    .map(|l| l.to_string())
}

fn top_language_by_stars(repos: &[RepositoryRecord]) -> Option<String> {
    let mut per_language: Vec<(&str, f64)> = Vec::new();
    for (language, _) in stats::tally(languages(repos.iter())) {
        let stars: Vec<f64> = repos
            .iter()
            .filter(|r| r.language.as_deref() == Some(language))
            .map(|r| r.stargazers_count as f64)
            .collect();
        if let Some(avg) = mean(&stars) {
            per_language.push((language, avg));
        }
    }

    per_language
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(language, _)| language.to_string())
}

fn projects_wiki_correlation(repos: &[RepositoryRecord]) -> Option<f64> {
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    let projects: Vec<f64> = repos.iter().map(|r| flag(r.has_projects)).collect();
    let wiki: Vec<f64> = repos.iter().map(|r| flag(r.has_wiki)).collect();
    pearson(&projects, &wiki)
}

/// Mean of `value` over hireable users minus the mean over everyone else.
fn hireable_difference<F>(users: &[UserRecord], value: F) -> Option<f64>
where
    F: Fn(&UserRecord) -> f64,
{
    let (hireable, rest): (Vec<&UserRecord>, Vec<&UserRecord>) =
        users.iter().partition(|u| u.is_hireable());
    let hireable: Vec<f64> = hireable.into_iter().map(&value).collect();
    let rest: Vec<f64> = rest.into_iter().map(&value).collect();
    Some(mean(&hireable)? - mean(&rest)?)
}

fn bio_words_slope(users: &[UserRecord]) -> Option<f64> {
    let (words, followers): (Vec<f64>, Vec<f64>) = users
        .iter()
        .filter_map(|u| {
            u.bio
                .as_deref()
                .map(|bio| (bio.split_whitespace().count() as f64, u.followers as f64))
        })
        .unzip();
    ols_slope(&words, &followers)
}

fn is_weekend(ts: DateTime<Utc>) -> bool {
    matches!(ts.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Last whitespace-separated word of the user's name.
fn surname(user: &UserRecord) -> Option<&str> {
    user.name.as_deref()?.split_whitespace().next_back()
}

struct Values<'a>(&'a [String]);

impl fmt::Display for Values<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("n/a")
        } else {
            f.write_str(&self.0.join(","))
        }
    }
}

struct Value<'a>(Option<&'a str>);

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.unwrap_or("n/a"))
    }
}

struct Number(Option<f64>);

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(x) => write!(f, "{x:.3}"),
            None => f.write_str("n/a"),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "1. Top 5 users by followers: {}", Values(&self.top_followed))?;
        writeln!(
            f,
            "2. 5 earliest registered users: {}",
            Values(&self.earliest_registered)
        )?;
        writeln!(f, "3. 3 most popular licenses: {}", Values(&self.top_licenses))?;
        writeln!(
            f,
            "4. Most common company: {}",
            Value(self.top_company.as_deref())
        )?;
        writeln!(
            f,
            "5. Most popular language: {}",
            Value(self.top_language.as_deref())
        )?;
        writeln!(
            f,
            "6. Second most popular language among users who joined after 2020: {}",
            Value(self.second_language_recent_users.as_deref())
        )?;
        writeln!(
            f,
            "7. Language with the highest average stars per repository: {}",
            Value(self.top_language_by_stars.as_deref())
        )?;
        writeln!(
            f,
            "8. Top 5 users by leader strength: {}",
            Values(&self.top_leader_strength)
        )?;
        writeln!(
            f,
            "9. Correlation between followers and public repositories: {}",
            Number(self.followers_repos_correlation)
        )?;
        writeln!(
            f,
            "10. Regression slope of followers on public repositories: {}",
            Number(self.followers_repos_slope)
        )?;
        writeln!(
            f,
            "11. Correlation between projects and wiki enabled: {}",
            Number(self.projects_wiki_correlation)
        )?;
        writeln!(
            f,
            "12. Difference in average following, hireable minus not: {}",
            Number(self.hireable_following_difference)
        )?;
        writeln!(
            f,
            "13. Regression slope of followers on bio word count: {}",
            Number(self.bio_words_slope)
        )?;
        writeln!(
            f,
            "14. Top 5 users by repositories created on weekends: {}",
            Values(&self.top_weekend_creators)
        )?;
        writeln!(
            f,
            "15. Difference in email sharing, hireable minus not: {}",
            Number(self.hireable_email_share_difference)
        )?;
        write!(
            f,
            "16. Most common surname(s): {}",
            Values(&self.common_surnames)
        )
    }
}

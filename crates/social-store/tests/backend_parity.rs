// Property tests: SqliteRepo and the in-memory Store agree on every
// sequence of association operations

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use proptest::prelude::*;
use social_core::{SocialRepo, Store, SyncOptions};

const N: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    SetProfile(usize, Option<usize>),
    SetProfileUser(usize, Option<usize>),
    AddPosts(usize, Vec<usize>),
    RemovePosts(usize, Vec<usize>),
    AddLikes(usize, Vec<usize>),
    AddLikers(usize, Vec<usize>),
    RemoveLikes(usize, Vec<usize>),
    DeleteUser(usize),
    DeletePost(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let idx = 0..N;
    let list = proptest::collection::vec(0..N, 0..4);
    prop_oneof![
        (idx.clone(), proptest::option::of(0..N)).prop_map(|(u, p)| Op::SetProfile(u, p)),
        (idx.clone(), proptest::option::of(0..N)).prop_map(|(p, u)| Op::SetProfileUser(p, u)),
        (idx.clone(), list.clone()).prop_map(|(u, ps)| Op::AddPosts(u, ps)),
        (idx.clone(), list.clone()).prop_map(|(u, ps)| Op::RemovePosts(u, ps)),
        (idx.clone(), list.clone()).prop_map(|(u, ls)| Op::AddLikes(u, ls)),
        (idx.clone(), list.clone()).prop_map(|(l, us)| Op::AddLikers(l, us)),
        (idx.clone(), list).prop_map(|(u, ls)| Op::RemoveLikes(u, ls)),
        idx.clone().prop_map(Op::DeleteUser),
        idx.prop_map(Op::DeletePost),
    ]
}

/// A backend seeded with N of each linked entity, ids kept by index
struct Fixture {
    users: Vec<String>,
    profiles: Vec<String>,
    posts: Vec<String>,
    likes: Vec<String>,
}

impl Fixture {
    fn seed(repo: &mut dyn SocialRepo) -> Self {
        Self {
            users: (0..N).map(|_| emart(repo).id).collect(),
            profiles: (0..N).map(|_| test_profile(repo).id).collect(),
            posts: (0..N).map(|_| test_post(repo).id).collect(),
            likes: (0..N).map(|_| happy_like(repo).id).collect(),
        }
    }

    fn ids(pool: &[String], picks: &[usize]) -> Vec<String> {
        picks.iter().map(|i| pool[*i].clone()).collect()
    }

    /// Apply an op; only success or failure is compared
    fn apply(&self, repo: &mut dyn SocialRepo, op: &Op) -> bool {
        match op {
            Op::SetProfile(u, p) => repo
                .set_user_profile(&self.users[*u], p.map(|p| self.profiles[p].as_str()))
                .is_ok(),
            Op::SetProfileUser(p, u) => repo
                .set_profile_user(&self.profiles[*p], u.map(|u| self.users[u].as_str()))
                .is_ok(),
            Op::AddPosts(u, ps) => repo
                .add_user_posts(&self.users[*u], &Self::ids(&self.posts, ps))
                .is_ok(),
            Op::RemovePosts(u, ps) => repo
                .remove_user_posts(&self.users[*u], &Self::ids(&self.posts, ps))
                .is_ok(),
            Op::AddLikes(u, ls) => repo
                .add_user_likes(&self.users[*u], &Self::ids(&self.likes, ls))
                .is_ok(),
            Op::AddLikers(l, us) => repo
                .add_like_users(&self.likes[*l], &Self::ids(&self.users, us))
                .is_ok(),
            Op::RemoveLikes(u, ls) => repo
                .remove_user_likes(&self.users[*u], &Self::ids(&self.likes, ls))
                .is_ok(),
            Op::DeleteUser(u) => repo.delete_user(&self.users[*u]).unwrap(),
            Op::DeletePost(p) => repo.delete_post(&self.posts[*p]).unwrap(),
        }
    }

    fn position(pool: &[String], id: &str) -> usize {
        pool.iter().position(|x| x == id).unwrap()
    }

    /// Every association rendered as index lists; missing owners show as None
    fn snapshot(&self, repo: &dyn SocialRepo) -> Vec<Option<Vec<usize>>> {
        let mut out = Vec::new();
        for user in &self.users {
            out.push(repo.get_user_profile(user).ok().map(|p| {
                p.into_iter()
                    .map(|p| Self::position(&self.profiles, &p.id))
                    .collect()
            }));
            out.push(repo.get_user_posts(user).ok().map(|ps| {
                ps.iter()
                    .map(|p| Self::position(&self.posts, &p.id))
                    .collect()
            }));
            out.push(repo.get_user_likes(user).ok().map(|ls| {
                ls.iter()
                    .map(|l| Self::position(&self.likes, &l.id))
                    .collect()
            }));
        }
        for profile in &self.profiles {
            out.push(repo.get_profile_user(profile).ok().map(|u| {
                u.into_iter()
                    .map(|u| Self::position(&self.users, &u.id))
                    .collect()
            }));
        }
        for like in &self.likes {
            out.push(repo.get_like_users(like).ok().map(|us| {
                us.iter()
                    .map(|u| Self::position(&self.users, &u.id))
                    .collect()
            }));
        }
        out
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sqlite_matches_in_memory_store(ops in proptest::collection::vec(op_strategy(), 1..20)) {
        let mut sqlite = setup_test_repo();
        let mut memory = Store::new().unwrap();
        memory.sync(SyncOptions::force()).unwrap();

        let on_sqlite = Fixture::seed(&mut sqlite);
        let in_memory = Fixture::seed(&mut memory);

        for op in &ops {
            let a = on_sqlite.apply(&mut sqlite, op);
            let b = in_memory.apply(&mut memory, op);
            prop_assert_eq!(a, b, "outcome differs for {:?}", op);
        }

        prop_assert_eq!(on_sqlite.snapshot(&sqlite), in_memory.snapshot(&memory));
    }
}

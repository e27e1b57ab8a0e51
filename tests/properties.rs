use quickcheck::{quickcheck, Arbitrary, Gen};
use range_automata::operations::{
    complement, concatenate, determinize, intersection, minimize, remove_dead_states, reverse,
    union, DEFAULT_DETERMINIZE_WORK_LIMIT,
};
use range_automata::{run, Automaton, Builder, Transition};

const WORK: usize = DEFAULT_DETERMINIZE_WORK_LIMIT;

/// A generated automaton with at most five states and labels drawn from
/// the four-letter alphabet the test strings use.
#[derive(Clone, Debug)]
struct SmallAutomaton(Automaton);

impl Arbitrary for SmallAutomaton {
    fn arbitrary(g: &mut Gen) -> SmallAutomaton {
        let num_states = 1 + u32::arbitrary(g) % 5;
        let mut b = Builder::new();
        for _ in 0..num_states {
            b.create_state();
        }
        for s in 0..num_states {
            b.set_accept(s, bool::arbitrary(g));
            for _ in 0..(u32::arbitrary(g) % 4) {
                let dest = u32::arbitrary(g) % num_states;
                let x = u32::from(b'a') + u32::arbitrary(g) % 4;
                let y = u32::from(b'a') + u32::arbitrary(g) % 4;
                b.add_transition(s, dest, x.min(y), x.max(y)).unwrap();
            }
        }
        SmallAutomaton(b.finish())
    }
}

/// Every string over {a, b, c, d} up to length 4.
fn test_strings() -> Vec<String> {
    let alphabet = ['a', 'b', 'c', 'd'];
    let mut strings = vec![String::new()];
    let mut level = vec![String::new()];
    for _ in 0..4 {
        let mut next = Vec::new();
        for prefix in &level {
            for &c in &alphabet {
                let mut s = prefix.clone();
                s.push(c);
                next.push(s);
            }
        }
        strings.extend(next.iter().cloned());
        level = next;
    }
    strings
}

fn det(a: Automaton) -> Automaton {
    determinize(a, WORK).unwrap()
}

quickcheck! {
    fn prop_minimize_preserves_language(a: SmallAutomaton) -> bool {
        let d = det(a.0.clone());
        let m = minimize(a.0, WORK).unwrap();
        test_strings().iter().all(|s| run(&d, s) == run(&m, s))
    }

    fn prop_reverse_is_an_involution(a: SmallAutomaton) -> bool {
        let round_trip = det(remove_dead_states(&reverse(&reverse(&a.0))));
        let d = det(a.0);
        test_strings().iter().all(|s| run(&d, s) == run(&round_trip, s))
    }

    fn prop_reverse_accepts_mirrored_strings(a: SmallAutomaton) -> bool {
        let d = det(a.0.clone());
        let r = det(reverse(&a.0));
        test_strings().iter().all(|s| {
            let mirrored: String = s.chars().rev().collect();
            run(&d, s) == run(&r, &mirrored)
        })
    }

    fn prop_union_is_disjunction(a: SmallAutomaton, b: SmallAutomaton) -> bool {
        let u = det(union(&[&a.0, &b.0]));
        let da = det(a.0);
        let db = det(b.0);
        test_strings().iter().all(|s| run(&u, s) == (run(&da, s) || run(&db, s)))
    }

    fn prop_intersection_is_conjunction(a: SmallAutomaton, b: SmallAutomaton) -> bool {
        let i = det(intersection(&a.0, &b.0));
        let da = det(a.0);
        let db = det(b.0);
        test_strings().iter().all(|s| run(&i, s) == (run(&da, s) && run(&db, s)))
    }

    fn prop_complement_is_negation(a: SmallAutomaton) -> bool {
        let c = complement(a.0.clone(), WORK).unwrap();
        let d = det(a.0);
        test_strings().iter().all(|s| run(&c, s) == !run(&d, s))
    }

    fn prop_concatenation_is_a_split(a: SmallAutomaton, b: SmallAutomaton) -> bool {
        let cat = det(concatenate(&[&a.0, &b.0]));
        let da = det(a.0);
        let db = det(b.0);
        test_strings().iter().all(|s| {
            let split = (0..=s.len()).any(|i| run(&da, &s[..i]) && run(&db, &s[i..]));
            run(&cat, s) == split
        })
    }

    fn prop_determinized_transitions_are_canonical(a: SmallAutomaton) -> bool {
        let d = det(a.0);
        if !d.is_deterministic() {
            return false;
        }
        let mut t = Transition::default();
        for s in 0..d.num_states() {
            let count = d.init_transition(s, &mut t);
            let mut prev: Option<(u32, u32, u32)> = None;
            for _ in 0..count {
                d.get_next_transition(&mut t);
                if let Some((_, pmax, pdest)) = prev {
                    // Strictly ascending and no mergeable neighbors.
                    if t.min <= pmax {
                        return false;
                    }
                    if pdest == t.dest && t.min == pmax + 1 {
                        return false;
                    }
                }
                prev = Some((t.min, t.max, t.dest));
            }
        }
        true
    }
}

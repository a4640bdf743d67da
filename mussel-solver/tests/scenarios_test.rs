#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::compare;
use helpers::linear;
use mussel_solver::mcs_from_mss;
use mussel_solver::model::Comparator;
use mussel_solver::model::Model;
use mussel_solver::options::MarcoOptions;
use mussel_solver::ConstraintId;
use mussel_solver::Explainer;
use mussel_solver::Explanation;

fn sorted(mut sets: Vec<Vec<ConstraintId>>) -> Vec<Vec<ConstraintId>> {
    sets.iter_mut().for_each(|set| set.sort());
    sets.sort();
    sets
}

#[test]
fn three_values_for_one_variable() {
    let mut model = Model::default();
    let x = model.new_variable("x", 0, 9);
    let soft = [1, 2, 3].map(|value| compare(&mut model, x, Comparator::Equal, value));

    let mut explainer = Explainer::new(&mut model);

    let muses = explainer.all_mus(&soft, &[], None).expect("decided");
    assert_eq!(
        sorted(muses),
        vec![
            vec![soft[0], soft[1]],
            vec![soft[0], soft[2]],
            vec![soft[1], soft[2]],
        ]
    );

    // Only a single value can be kept, so every correction removes two constraints.
    let mcses = explainer.all_mcs(&soft, &[], None).expect("decided");
    assert_eq!(
        sorted(mcses),
        vec![
            vec![soft[0], soft[1]],
            vec![soft[0], soft[2]],
            vec![soft[1], soft[2]],
        ]
    );

    for algorithm_result in [
        explainer.mus(&soft, &[]),
        explainer.mus_naive(&soft, &[]),
        explainer.quickxplain_naive(&soft, &[]),
    ] {
        let mus = algorithm_result.expect("unsatisfiable");
        assert_eq!(mus.len(), 2);
        assert!(explainer.is_mus(&mus, &[]).expect("decided"));
    }
}

#[test]
fn a_single_conflict_among_compatible_constraints() {
    let mut model = Model::default();
    let x = model.new_variable("x", 0, 9);
    let y = model.new_variable("y", 0, 9);
    let x_five = compare(&mut model, x, Comparator::Equal, 5);
    let x_at_least_three = compare(&mut model, x, Comparator::GreaterOrEqual, 3);
    let sum = linear(&mut model, &[(1, x), (1, y)], Comparator::Equal, 10);
    let x_seven = compare(&mut model, x, Comparator::Equal, 7);
    let y_at_most_eight = compare(&mut model, y, Comparator::LessOrEqual, 8);
    let soft = [x_five, x_at_least_three, sum, x_seven, y_at_most_eight];

    let mut explainer = Explainer::new(&mut model);

    assert_eq!(
        explainer.all_mus(&soft, &[], None).expect("decided"),
        vec![vec![x_five, x_seven]]
    );
    assert_eq!(explainer.mus(&soft, &[]).expect("unsatisfiable"), vec![x_five, x_seven]);

    // The constraints with a single variable are added first; x == 7 is the first one which
    // conflicts.
    let mss = explainer.mss_naive(&soft, &[]).expect("decided");
    assert_eq!(mss, vec![x_five, x_at_least_three, sum, y_at_most_eight]);
    assert_eq!(mcs_from_mss(&mss, &soft), vec![x_seven]);
    assert!(explainer.is_mss(&mss, &soft, &[]).expect("decided"));
    assert!(explainer.is_mcs(&[x_seven], &soft, &[]).expect("decided"));
    assert!(!explainer.is_mcs(&[x_five, x_seven], &soft, &[]).expect("decided"));

    let mss = explainer.mss(&soft, &[]).expect("decided");
    assert_eq!(mss.len(), 4);
    assert!(explainer.is_mss(&mss, &soft, &[]).expect("decided"));
}

#[test]
fn marco_enumerates_both_sides_of_the_conflict() {
    let mut model = Model::default();
    let x = model.new_variable("x", 0, 9);
    let y = model.new_variable("y", 0, 9);
    let x_five = compare(&mut model, x, Comparator::Equal, 5);
    let x_seven = compare(&mut model, x, Comparator::Equal, 7);
    let y_small = compare(&mut model, y, Comparator::Less, 2);
    let y_large = compare(&mut model, y, Comparator::Greater, 6);
    let free = compare(&mut model, y, Comparator::NotEqual, 4);
    let soft = [x_five, x_seven, y_small, y_large, free];

    let mut explainer = Explainer::new(&mut model);
    let explanations = explainer
        .marco(&soft, &[], MarcoOptions::default())
        .expect("valid soft constraints")
        .collect::<Result<Vec<_>, _>>()
        .expect("decided");

    let muses = explanations
        .iter()
        .filter(|explanation| explanation.is_mus())
        .map(|explanation| explanation.constraints().to_vec())
        .collect::<Vec<_>>();
    let mcses = explanations
        .iter()
        .filter_map(|explanation| match explanation {
            Explanation::Mcs(mcs) => Some(mcs.clone()),
            Explanation::Mus(_) => None,
        })
        .collect::<Vec<_>>();

    assert_eq!(
        sorted(muses),
        vec![vec![x_five, x_seven], vec![y_small, y_large]]
    );
    // Every MCS removes one constraint of each conflict.
    assert_eq!(
        sorted(mcses),
        vec![
            vec![x_five, y_small],
            vec![x_five, y_large],
            vec![x_seven, y_small],
            vec![x_seven, y_large],
        ]
    );

    let naive = explainer
        .marco_naive(&soft, &[], MarcoOptions::default())
        .expect("valid soft constraints")
        .collect::<Result<Vec<_>, _>>()
        .expect("decided");
    assert_eq!(naive.len(), explanations.len());
}

#[test]
fn hard_constraints_are_never_part_of_an_explanation() {
    let mut model = Model::default();
    let x = model.new_variable("x", 0, 9);
    let y = model.new_variable("y", 0, 9);
    let x_equals_y = linear(&mut model, &[(1, x), (-1, y)], Comparator::Equal, 0);
    let x_large = compare(&mut model, x, Comparator::GreaterOrEqual, 6);
    let y_small = compare(&mut model, y, Comparator::LessOrEqual, 3);
    let x_odd = compare(&mut model, x, Comparator::NotEqual, 8);
    let soft = [x_large, y_small, x_odd];

    let mut explainer = Explainer::new(&mut model);

    assert_eq!(
        explainer.mus(&soft, &[x_equals_y]).expect("unsatisfiable"),
        vec![x_large, y_small]
    );
    assert_eq!(
        explainer.mcs(&soft, &[x_equals_y]).expect("decided").len(),
        1
    );
    assert!(explainer.mus(&soft, &[]).is_err());
}

#[test]
fn indicators_can_be_cleared_between_explainers() {
    let mut model = Model::default();
    let x = model.new_variable("x", 0, 9);
    let soft = [5, 7].map(|value| compare(&mut model, x, Comparator::Equal, value));

    let mus = Explainer::new(&mut model).mus(&soft, &[]).expect("unsatisfiable");
    assert_eq!(mus, soft.to_vec());
    assert_eq!(model.num_indicators(), 2);

    model.clear_indicators();
    let mus = Explainer::new(&mut model).mus(&soft, &[]).expect("unsatisfiable");
    assert_eq!(mus, soft.to_vec());
    assert_eq!(model.num_indicators(), 2);
}
